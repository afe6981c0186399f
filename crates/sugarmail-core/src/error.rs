//! Error types for the core library.

use thiserror::Error;

use crate::compose::DraftError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Message decoding failed.
    #[error("Message error: {0}")]
    Mime(#[from] sugarmail_mime::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The draft cannot be sent as written.
    #[error("Invalid draft: {}", describe(.0))]
    Validation(Vec<DraftError>),
}

fn describe(errors: &[DraftError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
