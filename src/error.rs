use std::path::PathBuf;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum RepotreeError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid repository URL: {0}")]
    InvalidUrl(String),
    #[error("Request to {url} failed: {message}")]
    Http { url: String, message: String },
    #[error("Request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Failed to decode {context}: {source}")]
    Decode {
        context: String,
        source: serde_json::Error,
    },
    #[error("Invalid exclude pattern: {0}")]
    InvalidPattern(String),
    #[error("Invalid outline at line {line}: {message}")]
    InvalidOutline { line: usize, message: String },
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
impl RepotreeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RepotreeError::Io {
            path: path.into(),
            source,
        }
    }
    pub(crate) fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        RepotreeError::Decode {
            context: context.into(),
            source,
        }
    }
}
