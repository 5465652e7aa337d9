//! Error types
//!
//! One enum per failure domain. Validation and transport errors travel
//! through messages, so they stay `Clone`; export errors are handled on
//! the spot and can carry the underlying `io::Error`.

use thiserror::Error;

/// Rejections raised before a call is handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("url is empty")]
    EmptyUrl,
}

/// Failures while a call is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("could not read response body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Other(String),
}

/// Failures while exporting a response body to an editor.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write export file: {0}")]
    Io(#[from] std::io::Error),

    #[error("editor '{editor}' failed to start: {reason}")]
    EditorSpawn { editor: String, reason: String },
}
