//! On-disk content-addressed cache for compressed social-card images
//!
//! Keys are the md5 of the source image URL; values are resized, re-encoded
//! JPEG files in a flat directory, served statically. No TTL, no eviction:
//! the existence of the file at the derived path is the sole cache-hit
//! signal, and cleanup is an operator concern.

pub mod fetcher;
pub mod service;

pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use service::ImageCacheService;
