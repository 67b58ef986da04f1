//! Error types for card operations.

use thiserror::Error;

/// Result type for card operations.
pub type CardResult<T> = Result<T, CardError>;

/// Errors that can occur in card operations.
#[derive(Debug, Error)]
pub enum CardError {
    /// Free-text font size entry could not be read as a number.
    #[error("Invalid font size: {0}")]
    InvalidFontSize(String),

    /// A value outside one of the closed catalogs (position, font, preset, format).
    #[error("Unknown {kind}: {value}")]
    UnknownVariant {
        /// Catalog the value was looked up in.
        kind: &'static str,
        /// The rejected value.
        value: String,
    },

    /// Malformed `data:` URI for a background image.
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),

    /// Intent or state serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
