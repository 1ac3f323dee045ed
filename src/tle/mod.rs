//! Two/three-line element sets
//!
//! TLE text is kept verbatim as fetched; [`Tle::parse`] validates it through
//! the `sgp4` parser so malformed input is rejected when a satellite is
//! created rather than on its first update.

mod fetch;

pub use fetch::{
    catalog_id, get_cache_dir, CelestrakFetcher, DiskCachedFetcher, StaticFetcher, TleFetcher,
    CELESTRAK_URL_TEMPLATE,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Error type for TLE parsing and acquisition
#[derive(Debug, Error)]
pub enum TleError {
    #[error("Malformed TLE: {0}")]
    Malformed(String),

    #[error("Failed to fetch TLE for catalog number {id}: {reason}")]
    Fetch { id: String, reason: String },

    #[error("No TLE returned for catalog number {0}")]
    Empty(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for TLE operations
pub type Result<T> = std::result::Result<T, TleError>;

/// A parsed element set
#[derive(Debug, Clone, PartialEq)]
pub struct Tle {
    name: Option<String>,
    line1: String,
    line2: String,
}

impl Tle {
    /// Parse two-line or three-line (name first) TLE text
    ///
    /// Blank lines, surrounding whitespace and CRLF line endings are
    /// ignored. A `0 ` prefix on the name line (3LE format) is dropped.
    ///
    /// ```rust
    /// use quaternions::tle::Tle;
    ///
    /// let text = "ISS (ZARYA)\n\
    /// 1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927\n\
    /// 2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537\n";
    /// let tle = Tle::parse(text).unwrap();
    /// assert_eq!(tle.name(), Some("ISS (ZARYA)"));
    /// assert_eq!(tle.norad_id(), 25544);
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();

        let (name, line1, line2) = match lines.as_slice() {
            [line1, line2] => (None, *line1, *line2),
            [name, line1, line2] => {
                let name = name.strip_prefix("0 ").unwrap_or(name).trim();
                (Some(name.to_string()), *line1, *line2)
            }
            _ => {
                return Err(TleError::Malformed(format!(
                    "expected 2 or 3 non-empty lines, found {}",
                    lines.len()
                )))
            }
        };

        if !line1.starts_with("1 ") || !line2.starts_with("2 ") {
            return Err(TleError::Malformed(
                "element lines must start with '1 ' and '2 '".to_string(),
            ));
        }

        let tle = Tle {
            name,
            line1: line1.to_string(),
            line2: line2.to_string(),
        };
        tle.elements()?;
        Ok(tle)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn line1(&self) -> &str {
        &self.line1
    }

    pub fn line2(&self) -> &str {
        &self.line2
    }

    /// Satellite catalog number from line 1
    pub fn norad_id(&self) -> u64 {
        self.line1
            .get(2..7)
            .and_then(|field| field.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Orbital elements decoded by the propagator library
    pub fn elements(&self) -> Result<sgp4::Elements> {
        sgp4::Elements::from_tle(
            self.name.clone(),
            self.line1.as_bytes(),
            self.line2.as_bytes(),
        )
        .map_err(|e| TleError::Malformed(format!("{:?}", e)))
    }
}

impl fmt::Display for Tle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            writeln!(f, "{}", name)?;
        }
        writeln!(f, "{}", self.line1)?;
        write!(f, "{}", self.line2)
    }
}

impl std::str::FromStr for Tle {
    type Err = TleError;

    fn from_str(s: &str) -> Result<Self> {
        Tle::parse(s)
    }
}

/// Where a satellite's elements come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TleSource {
    /// Raw TLE text
    Tle { tle: String },
    /// Satellite catalog number, fetched through the TLE cache
    Norad { id: String },
}

/// Raw TLE text keyed by catalog number
///
/// Entries never expire; the first successful fetch is reused for the rest of
/// the session.
#[derive(Debug, Clone, Default)]
pub struct TleCache {
    entries: BTreeMap<String, String>,
}

impl TleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(id.into(), text.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached text for `id`, fetching and inserting it on a miss
    pub fn get_or_fetch(&mut self, id: &str, fetcher: &dyn TleFetcher) -> Result<String> {
        if let Some(text) = self.entries.get(id) {
            log::debug!("Using cached TLE for catalog number {}", id);
            return Ok(text.clone());
        }

        let text = fetcher.fetch(id)?;
        self.entries.insert(id.to_string(), text.clone());
        log::info!("Fetched and cached TLE for catalog number {}", id);
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    #[test]
    fn test_parse_three_lines() {
        let tle = Tle::parse(ISS_TLE).unwrap();
        assert_eq!(tle.name(), Some("ISS (ZARYA)"));
        assert_eq!(tle.norad_id(), 25544);
        assert!(tle.line1().starts_with("1 25544U"));
        assert!(tle.line2().starts_with("2 25544"));
    }

    #[test]
    fn test_parse_two_lines_crlf_and_blank_lines() {
        let mut lines = ISS_TLE.lines().skip(1);
        let text = format!(
            "\r\n{}\r\n{}\r\n\r\n",
            lines.next().unwrap(),
            lines.next().unwrap()
        );
        let tle = Tle::parse(&text).unwrap();
        assert_eq!(tle.name(), None);
        assert_eq!(tle.norad_id(), 25544);
    }

    #[test]
    fn test_parse_3le_name_prefix() {
        let text = ISS_TLE.replacen("ISS (ZARYA)", "0 ISS (ZARYA)", 1);
        let tle = Tle::parse(&text).unwrap();
        assert_eq!(tle.name(), Some("ISS (ZARYA)"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(Tle::parse(""), Err(TleError::Malformed(_))));
        assert!(matches!(
            Tle::parse("only one line"),
            Err(TleError::Malformed(_))
        ));
        assert!(matches!(
            Tle::parse("name\nfoo\nbar"),
            Err(TleError::Malformed(_))
        ));
        assert!(matches!(
            Tle::parse("1 not really\n2 element lines"),
            Err(TleError::Malformed(_))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        let tle = Tle::parse(ISS_TLE).unwrap();
        let again = Tle::parse(&tle.to_string()).unwrap();
        assert_eq!(tle, again);
    }

    #[test]
    fn test_cache_fetches_once() {
        let fetcher = StaticFetcher::new().with("25544", ISS_TLE);
        let mut cache = TleCache::new();

        let first = cache.get_or_fetch("25544", &fetcher).unwrap();
        assert_eq!(first, ISS_TLE);
        assert_eq!(fetcher.calls(), 1);

        let second = cache.get_or_fetch("25544", &fetcher).unwrap();
        assert_eq!(second, first);
        assert_eq!(fetcher.calls(), 1);
        assert!(cache.contains("25544"));
    }

    #[test]
    fn test_cache_miss_error_is_not_cached() {
        let fetcher = StaticFetcher::new();
        let mut cache = TleCache::new();
        assert!(cache.get_or_fetch("99999", &fetcher).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_source_serde() {
        let source: TleSource = serde_json::from_str(r#"{"type": "norad", "id": "25544"}"#).unwrap();
        assert_eq!(
            source,
            TleSource::Norad {
                id: "25544".to_string()
            }
        );
    }
}
