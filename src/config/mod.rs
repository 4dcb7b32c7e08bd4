use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub web: WebConfig,
    pub upstream: UpstreamConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

/// Public and backend base URLs. Either one missing disables bot-specific
/// rendering entirely; every request then falls through to the SPA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub app_base_url: Option<String>,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub spa_dist_path: PathBuf,
    pub cached_image_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web: WebConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            upstream: UpstreamConfig {
                app_base_url: None,
                api_base_url: None,
            },
            storage: StorageConfig {
                spa_dist_path: PathBuf::from("./dist"),
                cached_image_path: PathBuf::from("./data/cached-images"),
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());

        let mut config = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(&config_file)?;
            Self::from_toml(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config).map_err(|e| {
                AppError::configuration(format!("Failed to serialize default config: {}", e))
            })?;
            std::fs::write(&config_file, contents)?;
            default_config
        };

        // Environment overrides take precedence over the file
        if let Ok(url) = std::env::var("APP_BASE_URL") {
            if !url.is_empty() {
                config.upstream.app_base_url = Some(url);
            }
        }
        if let Ok(url) = std::env::var("API_BASE_URL") {
            if !url.is_empty() {
                config.upstream.api_base_url = Some(url);
            }
        }

        config.validate()?;
        std::fs::create_dir_all(&config.storage.cached_image_path)?;

        Ok(config)
    }

    pub fn from_toml(contents: &str) -> Result<Self, AppError> {
        toml::from_str(contents)
            .map_err(|e| AppError::configuration(format!("Invalid configuration: {}", e)))
    }

    /// Base URLs must parse as absolute URLs when configured at all.
    pub fn validate(&self) -> Result<(), AppError> {
        for (name, value) in [
            ("app_base_url", &self.upstream.app_base_url),
            ("api_base_url", &self.upstream.api_base_url),
        ] {
            if let Some(base_url) = value {
                url::Url::parse(base_url).map_err(|e| {
                    AppError::configuration(format!("Invalid {} '{}': {}", name, base_url, e))
                })?;
            }
        }
        Ok(())
    }

    /// True when both base URLs are configured and bot-specific rendering
    /// can run at all.
    pub fn rendering_enabled(&self) -> bool {
        self.upstream.app_base_url.is_some() && self.upstream.api_base_url.is_some()
    }
}
