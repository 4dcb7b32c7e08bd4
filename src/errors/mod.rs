//! Error handling for the bot-render application

pub mod types;

pub use types::{AppError, ImageCacheError, UpstreamError};
