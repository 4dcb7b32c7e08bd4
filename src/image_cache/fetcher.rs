use async_trait::async_trait;

use crate::errors::ImageCacheError;

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Capability interface for downloading a remote image, injectable for tests.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn download(&self, url: &str) -> Result<Vec<u8>, ImageCacheError>;
}

/// Production fetcher pulling the full resource into memory.
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn download(&self, url: &str) -> Result<Vec<u8>, ImageCacheError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageCacheError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.starts_with("image/") {
            return Err(ImageCacheError::NotAnImage { content_type });
        }

        let bytes = response.bytes().await?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageCacheError::TooLarge {
                size: bytes.len(),
                max_size: MAX_IMAGE_BYTES,
            });
        }

        Ok(bytes.to_vec())
    }
}
