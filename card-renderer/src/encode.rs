//! Raster image encoding.

use card_core::ExportFormat;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{RenderError, RenderResult};
use crate::raster::RasterImage;

/// Encoder settings.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    /// Lossy quality in 0.0..=1.0 (JPEG only; PNG and WebP are lossless).
    pub quality: f32,
    /// Color that transparent pixels are flattened onto for JPEG.
    pub matte: [u8; 3],
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            quality: 0.95,
            matte: [255, 255, 255],
        }
    }
}

impl EncodeOptions {
    /// JPEG quality on the 1-100 scale.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Encode a raster image in the given format.
///
/// # Errors
///
/// Returns an error if the pixel buffer does not match the dimensions or the
/// encoder fails.
pub fn encode(image: &RasterImage, format: ExportFormat, options: &EncodeOptions) -> RenderResult<Vec<u8>> {
    let expected = (image.width as usize) * (image.height as usize) * 4;
    if image.pixels.len() != expected {
        return Err(RenderError::Encode(format!(
            "pixel buffer is {} bytes, expected {expected}",
            image.pixels.len()
        )));
    }

    let mut buf = std::io::Cursor::new(Vec::new());
    let result = match format {
        ExportFormat::Png => image::codecs::png::PngEncoder::new(&mut buf).write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        ),
        ExportFormat::Jpg => {
            let rgb = flatten(&image.pixels, options.matte);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, options.jpeg_quality())
                .write_image(&rgb, image.width, image.height, ExtendedColorType::Rgb8)
        }
        ExportFormat::Webp => image::codecs::webp::WebPEncoder::new_lossless(&mut buf).write_image(
            &image.pixels,
            image.width,
            image.height,
            ExtendedColorType::Rgba8,
        ),
    };
    result.map_err(|e| RenderError::Encode(format!("{} encoding failed: {e}", format.as_str())))?;

    Ok(buf.into_inner())
}

/// Composite straight-alpha RGBA over an opaque matte, dropping alpha.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn flatten(rgba: &[u8], matte: [u8; 3]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for pixel in rgba.chunks_exact(4) {
        let alpha = f32::from(pixel[3]) / 255.0;
        let inv = 1.0 - alpha;
        for c in 0..3 {
            let value = f32::from(pixel[c]).mul_add(alpha, f32::from(matte[c]) * inv);
            rgb.push(value.round() as u8);
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterImage {
        RasterImage {
            width,
            height,
            pixels: rgba.repeat((width * height) as usize),
        }
    }

    #[test]
    fn test_png_magic() {
        let png = encode(&solid(4, 4, [255, 0, 0, 255]), ExportFormat::Png, &EncodeOptions::default())
            .expect("png");
        assert_eq!(&png[0..4], &[137, 80, 78, 71]);
    }

    #[test]
    fn test_jpeg_magic() {
        let jpeg = encode(&solid(4, 4, [0, 0, 255, 255]), ExportFormat::Jpg, &EncodeOptions::default())
            .expect("jpeg");
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_webp_magic() {
        let webp = encode(&solid(4, 4, [0, 255, 0, 128]), ExportFormat::Webp, &EncodeOptions::default())
            .expect("webp");
        assert_eq!(&webp[0..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");
    }

    #[test]
    fn test_png_roundtrip_preserves_pixels() {
        let source = solid(3, 2, [10, 20, 30, 255]);
        let png = encode(&source, ExportFormat::Png, &EncodeOptions::default()).expect("png");
        let decoded = image::load_from_memory(&png).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(2, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_mismatched_buffer_is_rejected() {
        let broken = RasterImage {
            width: 10,
            height: 10,
            pixels: vec![0; 12],
        };
        assert!(encode(&broken, ExportFormat::Png, &EncodeOptions::default()).is_err());
    }

    #[test]
    fn test_flatten_over_matte() {
        assert_eq!(flatten(&[0, 0, 0, 0], [255, 255, 255]), vec![255, 255, 255]);
        assert_eq!(flatten(&[10, 20, 30, 255], [255, 255, 255]), vec![10, 20, 30]);
    }

    #[test]
    fn test_jpeg_quality_mapping() {
        assert_eq!(EncodeOptions::default().jpeg_quality(), 95);
        let options = EncodeOptions {
            quality: 0.0,
            ..EncodeOptions::default()
        };
        assert_eq!(options.jpeg_quality(), 1);
    }
}
