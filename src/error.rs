//! Error types for the scoring pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by pipeline stages.
///
/// Aggregation gaps and degenerate score ranges are recovered inside the
/// stages that encounter them and never show up here.
#[derive(Error, Debug)]
pub enum ScoringError {
    /// Input file is missing or unreadable.
    #[error("cannot read transactions from {}: {source}", .path.display())]
    DataAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input is not a list of transaction objects with the required fields.
    #[error("malformed transaction batch: {0}")]
    Parse(String),

    /// The outlier model could not be fitted on the feature table.
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Score file could not be written.
    #[error("cannot write scores to {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Distribution chart could not be rendered.
    #[error("cannot render chart to {}: {reason}", .path.display())]
    Chart { path: PathBuf, reason: String },

    /// Configuration values are inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScoringError>;
