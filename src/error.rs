use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures surfaced by the `answer` boundary.
///
/// Finding nothing relevant is not an error: that comes back as a normal
/// fallback answer with no sources.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("message must not be empty")]
    EmptyMessage,

    #[error("document store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("{0}")]
    Unexpected(String),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
