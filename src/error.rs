//! Error types for data loading.
//!
//! Nothing on the scroll path returns these. Loaders propagate them with `?`
//! and the component boundary collapses them into an empty or absent value.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("unexpected shape in {what}")]
    Shape { what: String },
}

impl DataError {
    pub fn shape(what: impl Into<String>) -> Self {
        Self::Shape { what: what.into() }
    }
}
