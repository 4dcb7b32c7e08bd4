//! Web layer module
//!
//! One catch-all GET route implementing the responder decision sequence,
//! plus static serving for the SPA build output and the cached compressed
//! images. No error on the catch-all route ever reaches the client as a
//! failure status; the worst observable outcome is the SPA shell or a
//! redirect.

use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    bot_detect::BotDetector, config::Config, image_cache::ImageCacheService,
    metadata::MetadataClient, routing::RouteMatcher,
};

pub mod handlers;

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(
        config: Config,
        bot_detector: Arc<dyn BotDetector>,
        metadata: Arc<dyn MetadataClient>,
        image_cache: ImageCacheService,
    ) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;

        let app = Self::create_router(AppState {
            config,
            routes: Arc::new(RouteMatcher::new()),
            bot_detector,
            metadata,
            image_cache,
        });

        Ok(Self { app, addr })
    }

    /// Create the router with all routes and middleware
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health_check))
            // SPA build output and cached compressed images
            .nest_service(
                "/assets",
                ServeDir::new(state.config.storage.spa_dist_path.join("assets")),
            )
            .nest_service(
                "/cached-images",
                ServeDir::new(state.config.storage.cached_image_path.clone()),
            )
            // Everything else goes through the bot/human responder
            .fallback(get(handlers::render_entry))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub routes: Arc<RouteMatcher>,
    pub bot_detector: Arc<dyn BotDetector>,
    pub metadata: Arc<dyn MetadataClient>,
    pub image_cache: ImageCacheService,
}
