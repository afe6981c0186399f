//! Error types for message decoding.

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Decoding error types.
///
/// None of these are fatal: the resolver reports them and the host decides
/// whether to show a placeholder, pass text through, or carry on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No leaf part produced any renderable text.
    #[error("No renderable content in message")]
    NoRenderableContent,

    /// Both base64 alphabets failed; the text is passed through as-is.
    #[error("Base64 decode failed with both alphabets")]
    DecodeFallback,

    /// A searched-for field is not present anywhere in the value.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Malformed Gmail API JSON.
    #[error("Invalid message JSON: {0}")]
    Json(#[from] serde_json::Error),
}
