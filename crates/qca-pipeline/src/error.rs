//! Pipeline error types

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that abort a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration failed validation; every problem is listed
    #[error("configuration invalid:\n  - {}", .0.join("\n  - "))]
    Config(Vec<String>),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A phase was skipped but its materialized output is needed
    #[error("missing artifact from a previous phase: {0}")]
    MissingArtifact(String),
}
