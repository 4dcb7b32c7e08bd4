//! bot-render library
//!
//! A server-side rendering shim for single-page applications. Human visitors
//! get the SPA (or a redirect into it); crawler bots get a synthetic HTML
//! document carrying Open Graph metadata fetched from a backend API, with a
//! compressed social-card image cached on disk.

pub mod bot_detect;
pub mod config;
pub mod errors;
pub mod image_cache;
pub mod metadata;
pub mod routing;
pub mod web;
