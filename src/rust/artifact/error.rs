use std::io;
use std::path::PathBuf;

/// Errors raised while reading, validating or applying an artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Failed to read artifact {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed artifact: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported artifact format: expected {expected}, found {found}")]
    UnsupportedFormat { expected: &'static str, found: String },
    #[error("Unsupported {format} schema version {found} (supported: {supported})")]
    UnsupportedVersion {
        format: &'static str,
        found: u32,
        supported: u32,
    },
    #[error("Invalid artifact: {0}")]
    Invalid(String),
    #[error("Feature dimension mismatch: expected {expected}, got {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
