//! Load failures.

use std::path::PathBuf;
use thiserror::Error;

/// A dataset could not be produced at all.
///
/// Per-field problems (bad dates, missing amounts) never surface here; they
/// are coerced during parsing and counted in [`crate::models::LoadStats`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch dataset from {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("dataset request to {url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("dataset is not readable as CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}
