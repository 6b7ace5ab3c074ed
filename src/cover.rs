//! On-disk cache of cover images.
//!
//! A cover is stored as `<dir>/<sanitized key>.<ext>`. Presence of the file
//! is the whole cache: it never expires and is fetched at most once per key.

use crate::error::ScraperError;
use crate::http::{RetryPolicy, Transport};
use crate::utils::sanitize_name;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::debug;
use url::Url;

/// Image extensions kept as-is; anything else is stored as `jpg`.
const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Cover image cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct CoverCache {
    dir: PathBuf,
}

impl CoverCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Computes where the cover for `image_url` under `key` is stored.
    pub fn path_for(&self, image_url: &str, key: &str) -> Result<PathBuf, ScraperError> {
        let ext = image_extension(image_url)?;
        Ok(self.dir.join(format!("{}.{}", sanitize_name(key), ext)))
    }

    /// Returns the local path of the cover, downloading it only on a miss.
    pub async fn resolve(
        &self,
        transport: &dyn Transport,
        retry: RetryPolicy,
        image_url: &str,
        key: &str,
    ) -> Result<PathBuf, ScraperError> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(image_url, key)?;
        if path.exists() {
            debug!("Cover cache hit: {}", path.display());
            return Ok(path);
        }

        let bytes = retry
            .run("cover download", || transport.get_bytes(image_url))
            .await?;

        // A failed write must never leave a file at `path`.
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(&bytes)?;
        staged.persist(&path).map_err(|e| e.error)?;

        Ok(path)
    }
}

/// Picks the file extension from the last `.` suffix of the URL path.
fn image_extension(image_url: &str) -> Result<&'static str, ScraperError> {
    let url = Url::parse(image_url).map_err(|_| ScraperError::InvalidUrl(image_url.to_string()))?;
    let guess = url
        .path()
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    Ok(IMAGE_EXTENSIONS
        .iter()
        .find(|ext| **ext == guess)
        .copied()
        .unwrap_or("jpg"))
}
