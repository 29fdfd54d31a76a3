//! SDK error type.

/// Errors surfaced by network and storage operations.
///
/// User-facing paths (data refresh, strategy tips, publishing) degrade to a
/// fallback instead of returning these; the typed `try_*` variants expose them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to fetch existing file metadata (status {0})")]
    Metadata(u16),

    #[error("{0} configuration is missing")]
    MissingConfig(&'static str),

    #[error("empty response from model")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, Error>;
