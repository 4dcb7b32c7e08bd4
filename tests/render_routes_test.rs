use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

use bot_render::{
    bot_detect::SignatureBotDetector,
    config::Config,
    errors::{ImageCacheError, UpstreamError},
    image_cache::{ImageCacheService, ImageFetcher},
    metadata::{MetadataClient, PageMeta},
    routing::{EntityKind, RouteMatcher},
    web::{AppState, WebServer},
};

const GOOGLEBOT_UA: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
const CHROME_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const SPA_MARKER: &str = "spa-entry-document-marker";

/// Metadata stub: `Some` renders, `None` simulates an upstream failure.
struct StubMetadata {
    response: Option<PageMeta>,
}

#[async_trait]
impl MetadataClient for StubMetadata {
    async fn fetch(&self, kind: EntityKind, id: &str) -> Result<PageMeta, UpstreamError> {
        self.response.clone().ok_or(UpstreamError::Status {
            status: 502,
            url: format!("stub://{}/{}", kind.api_segment(), id),
        })
    }
}

/// Image fetcher that always fails, forcing degradation to the original URL.
struct FailingImageFetcher;

#[async_trait]
impl ImageFetcher for FailingImageFetcher {
    async fn download(&self, url: &str) -> Result<Vec<u8>, ImageCacheError> {
        Err(ImageCacheError::Status {
            status: 502,
            url: url.to_string(),
        })
    }
}

fn spa_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        format!("<!doctype html><html><body>{}</body></html>", SPA_MARKER),
    )
    .unwrap();
    dir
}

fn build_app(spa_dist: &Path, configured: bool, metadata: Option<PageMeta>) -> Router {
    let mut config = Config::default();
    config.storage.spa_dist_path = spa_dist.to_path_buf();
    config.storage.cached_image_path = spa_dist.join("cached-images");
    if configured {
        config.upstream.app_base_url = Some("http://app.example".to_string());
        config.upstream.api_base_url = Some("http://api.example".to_string());
    }

    let image_cache = ImageCacheService::new(
        config.storage.cached_image_path.clone(),
        Arc::new(FailingImageFetcher),
    );

    WebServer::create_router(AppState {
        config,
        routes: Arc::new(RouteMatcher::new()),
        bot_detector: Arc::new(SignatureBotDetector::new()),
        metadata: Arc::new(StubMetadata { response: metadata }),
        image_cache,
    })
}

fn product_meta() -> PageMeta {
    PageMeta {
        title: "Hand-thrown mug".to_string(),
        description: "Stoneware, 350ml".to_string(),
        image_url: "https://img.example/mug.jpg".to_string(),
    }
}

async fn get(app: &Router, uri: &str, user_agent: &str) -> (StatusCode, HeaderMap, String) {
    let request = Request::builder()
        .uri(uri)
        .header(header::USER_AGENT, user_agent)
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8_lossy(&body_bytes).into())
}

#[tokio::test]
async fn unmatched_paths_serve_spa_regardless_of_bot_status() {
    let dir = spa_dir();
    let app = build_app(dir.path(), true, Some(product_meta()));

    for ua in [GOOGLEBOT_UA, CHROME_UA] {
        let (status, _, body) = get(&app, "/about/team", ua).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(SPA_MARKER));
    }
}

#[tokio::test]
async fn resolved_marker_always_serves_spa() {
    let dir = spa_dir();
    let app = build_app(dir.path(), true, Some(product_meta()));

    let (status, _, body) = get(&app, "/products/abc123?resolved=true", GOOGLEBOT_UA).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(SPA_MARKER));
}

#[tokio::test]
async fn bot_on_product_path_gets_rendered_metadata_page() {
    let dir = spa_dir();
    let app = build_app(dir.path(), true, Some(product_meta()));

    let (status, _, body) = get(&app, "/products/abc123", GOOGLEBOT_UA).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<title>Hand-thrown mug</title>"));
    assert!(body.contains(
        r#"<meta property="og:url" content="http://app.example/products/abc123?resolved=true">"#
    ));
    assert!(body.contains(r#"<meta property="og:type" content="product">"#));
    // Image compression fails in this setup, so the original URL degrades in.
    assert!(body.contains(r#"content="https://img.example/mug.jpg""#));
    assert!(!body.contains(SPA_MARKER));
}

#[tokio::test]
async fn shop_pages_render_as_website_type() {
    let dir = spa_dir();
    let app = build_app(dir.path(), true, Some(product_meta()));

    let (status, _, body) = get(&app, "/shops/deadbeef-01", GOOGLEBOT_UA).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"<meta property="og:type" content="website">"#));
    assert!(body.contains(
        r#"content="http://app.example/shops/deadbeef-01?resolved=true""#
    ));
}

#[tokio::test]
async fn human_on_entity_path_is_redirected_to_resolved_url() {
    let dir = spa_dir();
    let app = build_app(dir.path(), true, Some(product_meta()));

    let (status, headers, _) = get(&app, "/products/abc123", CHROME_UA).await;
    assert!(status.is_redirection());
    assert_eq!(
        headers.get(header::LOCATION).unwrap(),
        "http://app.example/products/abc123?resolved=true"
    );
}

#[tokio::test]
async fn upstream_failure_serves_spa_not_5xx() {
    let dir = spa_dir();
    let app = build_app(dir.path(), true, None);

    let (status, _, body) = get(&app, "/products/abc123", GOOGLEBOT_UA).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(SPA_MARKER));
}

#[tokio::test]
async fn missing_base_urls_disable_bot_rendering() {
    let dir = spa_dir();
    let app = build_app(dir.path(), false, Some(product_meta()));

    let (status, _, body) = get(&app, "/products/abc123", GOOGLEBOT_UA).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(SPA_MARKER));
}

#[tokio::test]
async fn health_endpoint_responds() {
    let dir = spa_dir();
    let app = build_app(dir.path(), true, Some(product_meta()));

    let (status, _, body) = get(&app, "/health", CHROME_UA).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("healthy"));
}
