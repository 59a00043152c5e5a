use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Non-2xx status or a network failure talking to the hosted bin.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Body parsed but does not have the document shape.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("remote bin is not configured (set JSONBIN_BIN_ID and JSONBIN_API_KEY)")]
    NotConfigured,

    #[error("nothing to export: the local cache is empty")]
    NothingToExport,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
