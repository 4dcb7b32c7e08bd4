//! Error type definitions for the bot-render application
//!
//! Errors here are almost never surfaced to the HTTP client: the catch-all
//! route recovers from every failure by serving the SPA entry document (or,
//! for image failures, by degrading to the original remote image URL).

use thiserror::Error;

/// Top-level application error type
///
/// Upstream and image-cache failures never bubble up this far: the handler
/// recovers from them locally (SPA fallthrough, image degradation), so they
/// keep their own enums below and stay out of this one.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading and validation errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Template rendering errors
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the backend metadata API.
///
/// Any variant aborts bot-specific rendering for the request; the caller
/// serves the SPA entry document instead. No retry.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Network failures and malformed response bodies
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx responses
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },
}

/// Failures producing a compressed cached image.
///
/// Any variant degrades the response to the original remote image URL; it
/// never fails the request.
#[derive(Error, Debug)]
pub enum ImageCacheError {
    /// Download network failures
    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx responses from the image origin
    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The origin returned something that is not an image
    #[error("URL does not point to an image: {content_type}")]
    NotAnImage { content_type: String },

    /// Oversized source images are rejected before decoding
    #[error("Image too large: {size} bytes (max {max_size})")]
    TooLarge { size: usize, max_size: usize },

    /// Decode or re-encode failures
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    /// Cache directory I/O failures
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
