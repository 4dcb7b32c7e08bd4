//! Entity route matching
//!
//! Matches the normalized request path against the three entity URL patterns
//! (products, events, shops). Identifiers are lowercase hex digits and
//! dashes. A miss is a normal fallthrough to SPA serving, never an error.

use regex::Regex;

/// The three entity kinds the backend knows how to describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Product,
    Event,
    Business,
}

impl EntityKind {
    /// Path segment used in public app URLs.
    pub fn url_segment(&self) -> &'static str {
        match self {
            EntityKind::Product => "products",
            EntityKind::Event => "events",
            EntityKind::Business => "shops",
        }
    }

    /// Path segment used by the backend details API.
    pub fn api_segment(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::Event => "event",
            EntityKind::Business => "business",
        }
    }

    /// Open Graph content type for the rendered page.
    pub fn og_type(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            _ => "website",
        }
    }
}

/// A per-request entity reference derived from the URL. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

pub struct RouteMatcher {
    patterns: Vec<(EntityKind, Regex)>,
}

impl RouteMatcher {
    pub fn new() -> Self {
        // Fixed literal patterns; compiled once at startup.
        let patterns = vec![
            (
                EntityKind::Product,
                Regex::new(r"^products/([0-9a-f-]+)$").unwrap(),
            ),
            (
                EntityKind::Event,
                Regex::new(r"^events/([0-9a-f-]+)$").unwrap(),
            ),
            (
                EntityKind::Business,
                Regex::new(r"^shops/([0-9a-f-]+)$").unwrap(),
            ),
        ];
        Self { patterns }
    }

    /// Match a raw request path against the entity patterns, first match wins.
    ///
    /// The path is normalized by truncating at the first `?` (identifiers
    /// sometimes arrive with a trailing query fragment glued on) and
    /// stripping leading/trailing slashes.
    pub fn match_path(&self, path: &str) -> Option<EntityRef> {
        let normalized = path.split('?').next().unwrap_or(path).trim_matches('/');

        for (kind, pattern) in &self.patterns {
            if let Some(captures) = pattern.captures(normalized) {
                return Some(EntityRef {
                    kind: *kind,
                    id: captures[1].to_string(),
                });
            }
        }
        None
    }
}

impl Default for RouteMatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_product_paths() {
        let matcher = RouteMatcher::new();
        let entity = matcher
            .match_path("/products/3fa85f64-5717-4562-b3fc-2c963f66afa6")
            .unwrap();
        assert_eq!(entity.kind, EntityKind::Product);
        assert_eq!(entity.id, "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    }

    #[test]
    fn matches_event_and_shop_paths() {
        let matcher = RouteMatcher::new();
        assert_eq!(
            matcher.match_path("/events/abc123").unwrap().kind,
            EntityKind::Event
        );
        assert_eq!(
            matcher.match_path("/shops/deadbeef-01").unwrap().kind,
            EntityKind::Business
        );
    }

    #[test]
    fn truncates_trailing_query_fragment() {
        let matcher = RouteMatcher::new();
        let entity = matcher.match_path("/products/abc123?fbclid=xyz").unwrap();
        assert_eq!(entity.id, "abc123");
    }

    #[test]
    fn tolerates_missing_and_trailing_slashes() {
        let matcher = RouteMatcher::new();
        assert!(matcher.match_path("products/abc123").is_some());
        assert!(matcher.match_path("/products/abc123/").is_some());
    }

    #[test]
    fn rejects_non_entity_paths() {
        let matcher = RouteMatcher::new();
        assert!(matcher.match_path("/").is_none());
        assert!(matcher.match_path("/about").is_none());
        assert!(matcher.match_path("/products").is_none());
        assert!(matcher.match_path("/products/").is_none());
        assert!(matcher.match_path("/merchants/abc123").is_none());
        assert!(matcher.match_path("/products/abc123/reviews").is_none());
    }

    #[test]
    fn rejects_uppercase_and_non_hex_identifiers() {
        let matcher = RouteMatcher::new();
        assert!(matcher.match_path("/products/ABC123").is_none());
        assert!(matcher.match_path("/products/hello_world").is_none());
    }

    #[test]
    fn og_type_is_product_only_for_products() {
        assert_eq!(EntityKind::Product.og_type(), "product");
        assert_eq!(EntityKind::Event.og_type(), "website");
        assert_eq!(EntityKind::Business.og_type(), "website");
    }
}
