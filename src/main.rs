use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bot_render::{
    bot_detect::SignatureBotDetector,
    config::Config,
    image_cache::{HttpImageFetcher, ImageCacheService},
    metadata::{HttpMetadataClient, MetadataClient},
    web::WebServer,
};

#[derive(Parser)]
#[command(name = "bot-render")]
#[command(version = "0.1.0")]
#[command(about = "SEO pre-render shim serving Open Graph snapshots to crawlers")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with specified level
    let log_filter = if cli.log_level == "trace" {
        format!("bot_render={},tower_http=trace", cli.log_level)
    } else {
        format!("bot_render={}", cli.log_level)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting bot-render v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration from specified file
    std::env::set_var("CONFIG_FILE", &cli.config);
    let mut config = Config::load()?;
    info!("Configuration loaded from: {}", cli.config);

    // Override config with CLI arguments
    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }

    if !config.rendering_enabled() {
        warn!("APP_BASE_URL or API_BASE_URL not configured; every request will be served the SPA");
    }

    let bot_detector = Arc::new(SignatureBotDetector::new());
    info!("Bot signature classifier initialized");

    let metadata: Arc<dyn MetadataClient> = Arc::new(HttpMetadataClient::new(
        config.upstream.api_base_url.clone().unwrap_or_default(),
    ));

    let image_cache = ImageCacheService::new(
        config.storage.cached_image_path.clone(),
        Arc::new(HttpImageFetcher::new()),
    );
    info!(
        "Image cache initialized at {}",
        config.storage.cached_image_path.display()
    );

    let web_server = WebServer::new(config, bot_detector, metadata, image_cache)?;

    info!(
        "Starting web server on {}:{}",
        web_server.host(),
        web_server.port()
    );
    web_server.serve().await?;

    Ok(())
}
