//! Runtime settings
//!
//! Settings are plain JSON. Every field has a default, so a settings file only
//! needs the values it overrides.
//!
//! ```json
//! {
//!   "http_timeout_secs": 10,
//!   "default_scene": { "satellite_geo": [45.0, 10.0, 550.0] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::tle::{get_cache_dir, CelestrakFetcher, DiskCachedFetcher, CELESTRAK_URL_TEMPLATE};

/// Error type for loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write settings file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Entities recreated by a scene reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultScene {
    /// Name of the default oriented point
    pub satellite_name: String,
    /// Geographic position (lat°, lon°, alt km) of the default point
    pub satellite_geo: [f64; 3],
    /// Name of the line from the default point to the Earth centre
    pub nadir_line: String,
}

impl Default for DefaultScene {
    fn default() -> Self {
        Self {
            satellite_name: "sat".to_string(),
            satellite_geo: [39.0, 0.0, 500.0],
            nadir_line: "nadir".to_string(),
        }
    }
}

/// Crate-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// TLE endpoint, `{id}` is replaced by the catalog number
    pub tle_url_template: String,
    /// HTTP timeout for TLE requests
    pub http_timeout_secs: u64,
    /// Directory for cached TLE files; `$HOME/.cache/quaternions` when unset
    pub cache_dir: Option<PathBuf>,
    /// Keep fetched TLEs on disk between runs
    pub disk_cache: bool,
    pub default_scene: DefaultScene,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tle_url_template: CELESTRAK_URL_TEMPLATE.to_string(),
            http_timeout_secs: 30,
            cache_dir: None,
            disk_cache: true,
            default_scene: DefaultScene::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load from `path` when given, otherwise use the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Write settings as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, text).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tle_url_template.contains("{id}") {
            return Err(ConfigError::Invalid(format!(
                "tle_url_template '{}' has no {{id}} placeholder",
                self.tle_url_template
            )));
        }
        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "http_timeout_secs must be positive".to_string(),
            ));
        }
        let [lat, _, _] = self.default_scene.satellite_geo;
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ConfigError::Invalid(format!(
                "default satellite latitude {} outside [-90, 90]",
                lat
            )));
        }
        Ok(())
    }

    pub fn with_tle_url_template(mut self, template: impl Into<String>) -> Self {
        self.tle_url_template = template.into();
        self
    }

    pub fn with_http_timeout(mut self, secs: u64) -> Self {
        self.http_timeout_secs = secs;
        self
    }

    pub fn with_cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_disk_cache(mut self, enabled: bool) -> Self {
        self.disk_cache = enabled;
        self
    }

    pub fn with_default_scene(mut self, scene: DefaultScene) -> Self {
        self.default_scene = scene;
        self
    }

    /// Effective TLE cache directory
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(get_cache_dir)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// HTTP fetcher configured from these settings
    pub fn celestrak_fetcher(&self) -> CelestrakFetcher {
        CelestrakFetcher::new()
            .with_url_template(self.tle_url_template.clone())
            .with_timeout(self.http_timeout())
    }

    /// HTTP fetcher backed by the on-disk TLE cache
    pub fn cached_fetcher(&self) -> DiskCachedFetcher<CelestrakFetcher> {
        DiskCachedFetcher::new(self.celestrak_fetcher(), self.cache_dir().join("tle"))
    }
}
