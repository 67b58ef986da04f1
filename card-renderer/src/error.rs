//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur during rasterization and export.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource (background image, data URI, font) could not be loaded.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// The card could not be rasterized.
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// The raster image could not be encoded.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// An export is already running.
    #[error("An export is already in progress")]
    ExportInFlight,

    /// The sink has no share capability.
    #[error("Sharing is not available")]
    ShareUnavailable,

    /// Delivering the artifact failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// I/O error while writing an artifact.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
