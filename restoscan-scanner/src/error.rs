use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to start webscan server '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Webscan server closed the connection")]
    Disconnected,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Webscan {0} tool not found")]
    ToolNotFound(String),

    #[error("Webscan tool reported an error: {0}")]
    ToolFailed(String),

    #[error("Webscan call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Webscan server failed after {attempts} attempts: {last}")]
    RestartsExhausted { attempts: u32, last: Box<ScanError> },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScanError {
    /// Errors that a fresh server process may recover from.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScanError::IoError(_) | ScanError::Disconnected)
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
