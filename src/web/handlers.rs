use askama::Template;
use axum::{
    extract::State,
    http::{header, HeaderMap, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use super::AppState;
use crate::errors::AppError;
use crate::routing::EntityRef;

/// Fixed social-card image used when an entity carries no image at all.
const DEFAULT_IMAGE_PATH: &str = "/assets/social-card-default.jpg";

/// Served when the SPA entry document itself cannot be read. The route never
/// answers with a failure status.
const FALLBACK_SHELL: &str = "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Loading…</title></head><body></body></html>\n";

#[derive(Template)]
#[template(path = "bot_page.html")]
struct BotPageTemplate<'a> {
    title: &'a str,
    description: &'a str,
    image_url: &'a str,
    canonical_url: &'a str,
    og_type: &'a str,
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Catch-all GET handler: the responder decision sequence.
///
/// The outermost recovery boundary lives here: whatever goes wrong inside
/// the pipeline, the client gets the SPA entry document.
pub async fn render_entry(
    State(state): State<AppState>,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    match respond(&state, &uri, &headers).await {
        Ok(response) => response,
        Err(err) => {
            error!("Render pipeline failed for {}: {}", uri, err);
            serve_spa(&state).await
        }
    }
}

async fn respond(state: &AppState, uri: &Uri, headers: &HeaderMap) -> Result<Response, AppError> {
    // A post-redirect visit: the resolved marker suppresses bot-specific
    // processing so humans don't loop.
    if has_resolved_marker(uri.query()) {
        return Ok(serve_spa(state).await);
    }

    let (Some(app_base_url), Some(_)) = (
        state.config.upstream.app_base_url.as_deref(),
        state.config.upstream.api_base_url.as_deref(),
    ) else {
        return Ok(serve_spa(state).await);
    };

    let Some(entity) = state.routes.match_path(uri.path()) else {
        return Ok(serve_spa(state).await);
    };

    let canonical_url = canonical_resolved_url(app_base_url, &entity);

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !state.bot_detector.is_bot(user_agent) {
        debug!("Human visitor on {}, redirecting to {}", uri.path(), canonical_url);
        return Ok(Redirect::temporary(&canonical_url).into_response());
    }

    let meta = match state.metadata.fetch(entity.kind, &entity.id).await {
        Ok(meta) => meta,
        Err(err) => {
            warn!(
                "Metadata fetch failed for {} {}: {}",
                entity.kind.api_segment(),
                entity.id,
                err
            );
            return Ok(serve_spa(state).await);
        }
    };

    let image_url = resolve_image(state, app_base_url, &meta.image_url).await;

    let page = BotPageTemplate {
        title: &meta.title,
        description: &meta.description,
        image_url: &image_url,
        canonical_url: &canonical_url,
        og_type: entity.kind.og_type(),
    };
    Ok(Html(page.render()?).into_response())
}

/// Serve the SPA entry document. Read failures degrade to a minimal shell
/// rather than a 5xx.
pub async fn serve_spa(state: &AppState) -> Response {
    let index_path = state.config.storage.spa_dist_path.join("index.html");
    match tokio::fs::read_to_string(&index_path).await {
        Ok(contents) => Html(contents).into_response(),
        Err(err) => {
            error!(
                "Failed to read SPA entry document {}: {}",
                index_path.display(),
                err
            );
            Html(FALLBACK_SHELL.to_string()).into_response()
        }
    }
}

/// Run the image-cache step, degrading in two stages: a failed compression
/// falls back to the original remote URL, an empty input falls back to the
/// fixed default card.
async fn resolve_image(state: &AppState, app_base_url: &str, source_url: &str) -> String {
    if source_url.is_empty() {
        return format!("{}{}", app_base_url.trim_end_matches('/'), DEFAULT_IMAGE_PATH);
    }

    match state.image_cache.compressed_file(source_url).await {
        Ok(file_name) => format!(
            "{}/cached-images/{}",
            app_base_url.trim_end_matches('/'),
            file_name
        ),
        Err(err) => {
            warn!("Image compression failed for {}: {}", source_url, err);
            source_url.to_string()
        }
    }
}

fn canonical_resolved_url(app_base_url: &str, entity: &EntityRef) -> String {
    format!(
        "{}/{}/{}?resolved=true",
        app_base_url.trim_end_matches('/'),
        entity.kind.url_segment(),
        entity.id
    )
}

/// Presence of the `resolved` query parameter, value ignored.
fn has_resolved_marker(query: Option<&str>) -> bool {
    let Some(query) = query else {
        return false;
    };
    url::form_urlencoded::parse(query.as_bytes()).any(|(key, _)| key == "resolved")
}
