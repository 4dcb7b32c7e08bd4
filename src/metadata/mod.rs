//! Upstream metadata fetching
//!
//! One GET against the backend details API per matched entity request. The
//! response is reduced to the three fields the crawler page needs (title,
//! description, image), with fixed fallbacks for anything missing. Any fetch
//! failure aborts bot-specific rendering for the whole request; the caller
//! serves the SPA entry document instead.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::errors::UpstreamError;
use crate::routing::EntityKind;

pub const DEFAULT_TITLE: &str = "Shop local products, events and stores";
pub const DEFAULT_DESCRIPTION: &str =
    "Browse products, events and shops from independent local businesses.";

/// The metadata embedded into the crawler-facing HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    /// Remote image URL; empty when the entity carries no usable image.
    pub image_url: String,
}

/// Capability interface for the backend details API, injectable for tests.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    async fn fetch(&self, kind: EntityKind, id: &str) -> Result<PageMeta, UpstreamError>;
}

/// Production client issuing a single GET to
/// `{api_base_url}/api/details/{kind}/{id}`.
pub struct HttpMetadataClient {
    client: reqwest::Client,
    api_base_url: String,
}

impl HttpMetadataClient {
    pub fn new(api_base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base_url,
        }
    }
}

#[async_trait]
impl MetadataClient for HttpMetadataClient {
    async fn fetch(&self, kind: EntityKind, id: &str) -> Result<PageMeta, UpstreamError> {
        let url = format!(
            "{}/api/details/{}/{}",
            self.api_base_url.trim_end_matches('/'),
            kind.api_segment(),
            id
        );
        debug!("Fetching entity metadata from {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body: Value = response.json().await?;
        Ok(PageMeta::from_details(kind, &body))
    }
}

impl PageMeta {
    /// Reduce a details API response body to page metadata.
    ///
    /// The body is expected to look like
    /// `{ "data": { name|business_name, description, images|logo|photo_url } }`.
    /// Missing or empty fields fall back to fixed literals (title,
    /// description) or to an empty image URL. Only a failed fetch is an
    /// error; a sparse body is not.
    pub fn from_details(kind: EntityKind, body: &Value) -> Self {
        let null = Value::Null;
        let data = body.get("data").unwrap_or(&null);

        let title = match kind {
            EntityKind::Business => text_field(data, "business_name")
                .or_else(|| text_field(data, "name")),
            _ => text_field(data, "name"),
        }
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let description = text_field(data, "description")
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());

        let image_url = match kind {
            EntityKind::Business => text_field(data, "logo")
                .or_else(|| text_field(data, "photo_url"))
                .unwrap_or_default(),
            _ => first_image_url(data.get("images")),
        };

        Self {
            title,
            description,
            image_url,
        }
    }
}

/// Extract a non-empty string field, treating null/empty/absent uniformly.
fn text_field(data: &Value, field: &str) -> Option<String> {
    data.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The `images` field arrives as a string-encoded JSON array of `{url}`
/// objects. Parse it defensively: anything malformed yields no image rather
/// than an error. A plain (non-encoded) array is tolerated too.
fn first_image_url(images: Option<&Value>) -> String {
    let parsed: Value = match images {
        Some(Value::String(raw)) => serde_json::from_str(raw).unwrap_or(Value::Null),
        Some(value @ Value::Array(_)) => value.clone(),
        _ => Value::Null,
    };

    parsed
        .as_array()
        .and_then(|entries| entries.first())
        .and_then(|entry| entry.get("url"))
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}
