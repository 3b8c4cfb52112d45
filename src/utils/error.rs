//! Error taxonomy for the report pipeline.
//!
//! Every variant carries the file it concerns so the message points at the
//! offending input. Empty discovery is not an error; see `RunOutcome::Empty`.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// A primary metric file exists but its paired file does not.
    #[error("companion file not found: {}", path.display())]
    MissingCompanion { path: PathBuf },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    /// The CSV reader could not split the file into header and cells.
    #[error("failed to read {}: {source}", path.display())]
    Frame { path: PathBuf, source: PolarsError },

    #[error("table operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("malformed table {} (row {row}): {reason}", path.display())]
    Malformed {
        path: PathBuf,
        row: u64,
        reason: String,
    },

    #[error("no run metadata found (tried {})", display_paths(tried))]
    MissingMetadata { tried: Vec<PathBuf> },

    #[error("invalid run metadata in {}: {reason}", path.display())]
    InvalidMetadata { path: PathBuf, reason: String },

    #[error("failed to parse run metadata {}: {source}", path.display())]
    MetadataJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid discovery pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("rendering failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, row: u64, reason: impl Into<String>) -> Self {
        ReportError::Malformed {
            path: path.into(),
            row,
            reason: reason.into(),
        }
    }

    pub(crate) fn frame(path: impl Into<PathBuf>, source: PolarsError) -> Self {
        ReportError::Frame {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn render<E: std::fmt::Display>(err: E) -> Self {
        ReportError::Render(err.to_string())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
