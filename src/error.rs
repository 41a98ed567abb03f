use std::io;
use std::path::PathBuf;

use crate::sort::SortError;

/// Errors surfaced by the benchmark harness.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rejected before any measurement was taken.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown algorithm: {name} (see `sort-bench list`)")]
    UnknownAlgorithm { name: String },

    #[error("algorithm {algorithm} failed: {source}")]
    Sort {
        algorithm: String,
        #[source]
        source: SortError,
    },
}

pub type BenchResult<T> = Result<T, BenchError>;

impl BenchError {
    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        BenchError::Csv {
            path: path.into(),
            source,
        }
    }
}
