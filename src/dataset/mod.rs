//! The immutable funding table and its sources.
//!
//! A [`Dataset`] is built once by the loader and only ever handed out by
//! shared reference or `Arc`, so every query sees the same rows.

pub mod cache;
pub mod error;
pub mod loader;

pub use cache::DatasetCache;
pub use error::LoadError;
pub use loader::{load_source, LoadOptions};

use crate::models::{FundingRecord, LoadStats};
use std::fmt;
use std::path::PathBuf;

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// A CSV file on the local filesystem.
    Path(PathBuf),
    /// A CSV file served over HTTP(S).
    Url(String),
}

impl Source {
    /// Interpret a user-supplied location.
    ///
    /// GitHub `blob` page URLs are rewritten to the raw file URL, since the
    /// page itself is HTML.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = raw_github_url(raw).unwrap_or_else(|| raw.to_string());
            Source::Url(url)
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Rewrite `https://github.com/<owner>/<repo>/blob/<ref>/<path>` to its
/// `raw.githubusercontent.com` equivalent.
pub fn raw_github_url(url: &str) -> Option<String> {
    let url = url.split(['?', '#']).next().unwrap_or(url);
    let rest = url.strip_prefix("https://github.com/")?;

    let parts: Vec<&str> = rest.splitn(4, '/').collect();
    if parts.len() == 4 && parts[2] == "blob" && !parts[3].is_empty() {
        return Some(format!(
            "https://raw.githubusercontent.com/{}/{}/{}",
            parts[0], parts[1], parts[3]
        ));
    }

    None
}

/// The loaded funding table.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: String,
    records: Vec<FundingRecord>,
    stats: LoadStats,
}

impl Dataset {
    pub fn new(source: impl Into<String>, records: Vec<FundingRecord>, stats: LoadStats) -> Self {
        Self {
            source: source.into(),
            records,
            stats,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn records(&self) -> &[FundingRecord] {
        &self.records
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
