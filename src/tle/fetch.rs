//! TLE acquisition
//!
//! Fetchers return raw TLE text for a satellite catalog number. The HTTP
//! fetcher talks to Celestrak; the disk cache wraps any fetcher and keeps one
//! file per catalog number.

use std::cell::Cell;
use std::collections::HashMap;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Result, TleError};

/// Celestrak GP endpoint; `{id}` is replaced by the catalog number
pub const CELESTRAK_URL_TEMPLATE: &str =
    "https://celestrak.org/NORAD/elements/gp.php?CATNR={id}&FORMAT=3LE";

/// Source of raw TLE text
pub trait TleFetcher {
    /// Raw TLE text for the catalog number `id`
    fn fetch(&self, id: &str) -> Result<String>;
}

/// Get the cache directory path
pub fn get_cache_dir() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".cache").join("quaternions")
}

fn fetch_error(id: &str, reason: impl Into<String>) -> TleError {
    TleError::Fetch {
        id: id.to_string(),
        reason: reason.into(),
    }
}

/// Trimmed catalog number; must be non-empty ASCII alphanumerics
pub fn catalog_id(id: &str) -> Result<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(fetch_error(
            id,
            "catalog number must be non-empty and alphanumeric",
        ));
    }
    Ok(trimmed)
}

/// Blocking HTTP fetcher for the Celestrak GP service
#[derive(Debug, Clone)]
pub struct CelestrakFetcher {
    url_template: String,
    timeout: Duration,
}

impl CelestrakFetcher {
    pub fn new() -> Self {
        Self {
            url_template: CELESTRAK_URL_TEMPLATE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Use a different endpoint; `{id}` marks the catalog number
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Request URL for a catalog number
    pub fn url_for(&self, id: &str) -> Result<String> {
        Ok(self.url_template.replace("{id}", catalog_id(id)?))
    }
}

impl Default for CelestrakFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TleFetcher for CelestrakFetcher {
    fn fetch(&self, id: &str) -> Result<String> {
        let url = self.url_for(id)?;
        log::debug!("Requesting TLE from {}", url);

        // Create HTTP client with timeout
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| fetch_error(id, format!("failed to create HTTP client: {}", e)))?;

        let response = client
            .get(&url)
            .send()
            .map_err(|e| fetch_error(id, e.to_string()))?;

        if !response.status().is_success() {
            return Err(fetch_error(id, format!("status {}", response.status())));
        }

        let body = response
            .text()
            .map_err(|e| fetch_error(id, format!("failed to read response: {}", e)))?;

        // Celestrak answers unknown catalog numbers with 200 and a message
        if body.trim().is_empty() || body.trim_start().starts_with("No GP data") {
            return Err(TleError::Empty(id.to_string()));
        }

        Ok(body)
    }
}

/// Check if a file exists and is not empty
fn file_exists_and_not_empty<P: AsRef<Path>>(path: P) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.len() > 0,
        Err(_) => false,
    }
}

/// Keeps fetched TLEs on disk, one `<id>.tle` file per catalog number
///
/// Files are never revalidated; delete them to force a refetch.
#[derive(Debug, Clone)]
pub struct DiskCachedFetcher<F> {
    inner: F,
    cache_dir: PathBuf,
}

impl<F: TleFetcher> DiskCachedFetcher<F> {
    pub fn new(inner: F, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf> {
        Ok(self.cache_dir.join(format!("{}.tle", catalog_id(id)?)))
    }

    fn store(&self, path: &Path, text: &str) -> Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        // Write a temporary file first to avoid partial entries
        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        drop(file);

        fs::rename(temp_path, path)?;
        Ok(())
    }
}

impl<F: TleFetcher> TleFetcher for DiskCachedFetcher<F> {
    fn fetch(&self, id: &str) -> Result<String> {
        let path = self.path_for(id)?;

        if file_exists_and_not_empty(&path) {
            log::debug!("Using cached TLE file {}", path.display());
            return Ok(fs::read_to_string(&path)?);
        }

        let text = self.inner.fetch(id)?;
        if let Err(e) = self.store(&path, &text) {
            log::warn!("Failed to cache TLE for {} at {}: {}", id, path.display(), e);
        }
        Ok(text)
    }
}

/// In-memory fetcher serving fixed texts, for offline scripts and tests
#[derive(Debug, Default)]
pub struct StaticFetcher {
    entries: HashMap<String, String>,
    calls: Cell<usize>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(id.into(), text.into());
        self
    }

    /// Number of fetch calls served or refused so far
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl TleFetcher for StaticFetcher {
    fn fetch(&self, id: &str) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.entries
            .get(id)
            .cloned()
            .ok_or_else(|| TleError::Empty(id.to_string()))
    }
}
