//! Background image loading utilities.
//!
//! Uploaded files are sniffed and decoded once before they reach the editor,
//! so a malformed upload is rejected instead of rendering a broken card.

use base64::Engine;
use card_core::BackgroundImage;

use crate::error::{RenderError, RenderResult};

/// Supported image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// GIF (first frame only).
    Gif,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::WebP,
            "gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            "image/gif" => Self::Gif,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        if data.starts_with(b"GIF8") {
            return Self::Gif;
        }

        Self::Unknown
    }

    /// Canonical MIME type, `None` for unknown formats.
    #[must_use]
    pub fn mime(self) -> Option<&'static str> {
        match self {
            Self::Png => Some("image/png"),
            Self::Jpeg => Some("image/jpeg"),
            Self::WebP => Some("image/webp"),
            Self::Gif => Some("image/gif"),
            Self::Unknown => None,
        }
    }
}

/// A validated background image with its pixel dimensions.
#[derive(Debug, Clone)]
pub struct LoadedBackground {
    /// Payload ready to hand to the editor.
    pub image: BackgroundImage,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Validate an uploaded file and wrap it as a [`BackgroundImage`].
///
/// The format is taken from the magic bytes, falling back to the declared
/// MIME type. The payload is decoded once to make sure it is an image.
///
/// # Errors
///
/// Returns an error if the format is unknown or the image cannot be decoded.
pub fn decode_background(bytes: Vec<u8>, declared_mime: &str) -> RenderResult<LoadedBackground> {
    let format = match ImageFormat::from_magic_bytes(&bytes) {
        ImageFormat::Unknown => ImageFormat::from_mime(declared_mime),
        sniffed => sniffed,
    };
    let mime = format.mime().ok_or_else(|| {
        RenderError::Resource(format!("Unsupported image type: {declared_mime}"))
    })?;

    let img = image::load_from_memory(&bytes)
        .map_err(|e| RenderError::Resource(format!("Failed to decode image: {e}")))?;

    tracing::debug!(
        mime,
        width = img.width(),
        height = img.height(),
        "Decoded background image"
    );

    Ok(LoadedBackground {
        width: img.width(),
        height: img.height(),
        image: BackgroundImage::new(mime, bytes),
    })
}

/// Encode bytes as a base64 `data:` URI.
#[must_use]
pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}
