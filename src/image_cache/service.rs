use image::imageops::FilterType;
use image::ImageOutputFormat;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::debug;

use crate::errors::ImageCacheError;
use crate::image_cache::ImageFetcher;

const TARGET_WIDTH: u32 = 1200;
const TARGET_HEIGHT: u32 = 630;
const JPEG_QUALITY: u8 = 75;

/// Content-addressed cache of compressed social-card images.
///
/// Concurrent misses for the same URL are not coordinated: both requests
/// download and compress redundantly, and the second write lands on the same
/// deterministic content. Harmless.
#[derive(Clone)]
pub struct ImageCacheService {
    cache_dir: PathBuf,
    fetcher: Arc<dyn ImageFetcher>,
}

impl ImageCacheService {
    pub fn new(cache_dir: PathBuf, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { cache_dir, fetcher }
    }

    /// Cache file name for a source URL. Pure function of the URL bytes,
    /// stable across process restarts.
    pub fn cache_file_name(source_url: &str) -> String {
        format!("{:x}.jpg", md5::compute(source_url.as_bytes()))
    }

    /// Return the cached compressed file name for a source URL, producing it
    /// on first use.
    ///
    /// Hit: the file exists at the derived path, returned without touching
    /// the network. Miss: download, resize to fill the fixed target
    /// dimensions, re-encode as JPEG, write to a temp file and rename into
    /// place. Every failure is reported to the caller, which degrades to the
    /// original remote URL.
    pub async fn compressed_file(&self, source_url: &str) -> Result<String, ImageCacheError> {
        let file_name = Self::cache_file_name(source_url);
        let file_path = self.cache_dir.join(&file_name);

        if file_path.exists() {
            debug!("Image cache hit for {}", source_url);
            return Ok(file_name);
        }

        let data = self.fetcher.download(source_url).await?;
        let compressed = compress(&data)?;

        fs::create_dir_all(&self.cache_dir).await?;
        // Unique temp name per writer: concurrent misses for the same URL
        // must not rename each other's file out from under them.
        static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);
        let tmp_path = self.cache_dir.join(format!(
            "{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp_path, &compressed).await?;
        fs::rename(&tmp_path, &file_path).await?;

        debug!(
            "Cached compressed image for {} ({} -> {} bytes)",
            source_url,
            data.len(),
            compressed.len()
        );
        Ok(file_name)
    }
}

/// Resize with crop-to-fill and re-encode as JPEG at fixed quality.
fn compress(data: &[u8]) -> Result<Vec<u8>, ImageCacheError> {
    let img = image::load_from_memory(data)?;
    let resized = img.resize_to_fill(TARGET_WIDTH, TARGET_HEIGHT, FilterType::Lanczos3);

    let mut out = Vec::new();
    resized.write_to(
        &mut Cursor::new(&mut out),
        ImageOutputFormat::Jpeg(JPEG_QUALITY),
    )?;
    Ok(out)
}
