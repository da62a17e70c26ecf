use crate::error::{ProcessingError, ProcessingResult};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use ringside_core::OutputFormat;
use std::io::Cursor;

/// Largest dimension libwebp accepts
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Encodes decoded images into the configured output format.
///
/// Only pixel data is written; no metadata from the source file survives.
pub struct ImageCompressor;

impl ImageCompressor {
    /// Compress image with specified format and quality (1-100)
    pub fn compress(
        img: &DynamicImage,
        format: OutputFormat,
        quality: u8,
    ) -> ProcessingResult<Bytes> {
        let quality = quality.clamp(1, 100);
        match format {
            OutputFormat::WebP => Self::compress_webp(img, quality),
            OutputFormat::Jpeg => Self::compress_jpeg(img, quality),
            OutputFormat::Png => Self::compress_png(img),
        }
    }

    /// Compress to lossy WebP
    fn compress_webp(img: &DynamicImage, quality: u8) -> ProcessingResult<Bytes> {
        let (width, height) = img.dimensions();
        if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
            return Err(ProcessingError::Encode(format!(
                "{}x{} exceeds the WebP limit of {}px",
                width, height, WEBP_MAX_DIMENSION
            )));
        }

        // Convert to RGBA for WebP encoding
        let rgba_img = img.to_rgba8();

        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder
            .encode_simple(false, quality as f32)
            .map_err(|e| ProcessingError::Encode(format!("WebP encoding failed: {:?}", e)))?;

        Ok(Bytes::copy_from_slice(&webp_data))
    }

    /// Compress to baseline JPEG; alpha is flattened away
    fn compress_jpeg(img: &DynamicImage, quality: u8) -> ProcessingResult<Bytes> {
        let rgb_img = DynamicImage::ImageRgb8(img.to_rgb8());
        let (width, height) = rgb_img.dimensions();

        let mut buffer = Vec::with_capacity((width * height) as usize / 4);
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb_img
            .write_with_encoder(encoder)
            .map_err(|e| ProcessingError::Encode(format!("JPEG encoding failed: {}", e)))?;

        Ok(Bytes::from(buffer))
    }

    /// Compress to PNG (lossless, quality is ignored)
    fn compress_png(img: &DynamicImage) -> ProcessingResult<Bytes> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| ProcessingError::Encode(format!("PNG encoding failed: {}", e)))?;

        Ok(Bytes::from(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 8, Rgba([200, 30, 30, 255])))
    }

    #[test]
    fn test_compress_webp_container() {
        let data = ImageCompressor::compress(&sample(), OutputFormat::WebP, 80).unwrap();
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }

    #[test]
    fn test_compress_jpeg_drops_alpha() {
        let data = ImageCompressor::compress(&sample(), OutputFormat::Jpeg, 75).unwrap();
        assert_eq!(&data[0..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&data).unwrap();
        assert_eq!(decoded.dimensions(), (16, 8));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_compress_png_roundtrips_pixels() {
        let data = ImageCompressor::compress(&sample(), OutputFormat::Png, 10).unwrap();
        let decoded = image::load_from_memory(&data).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(3, 3), &Rgba([200, 30, 30, 255]));
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let noisy = RgbaImage::from_fn(64, 64, |x, y| {
            Rgba([
                (x * 7 % 255) as u8,
                (y * 13 % 255) as u8,
                ((x ^ y) * 5 % 255) as u8,
                255,
            ])
        });
        let img = DynamicImage::ImageRgba8(noisy);

        let low = ImageCompressor::compress(&img, OutputFormat::Jpeg, 10).unwrap();
        let high = ImageCompressor::compress(&img, OutputFormat::Jpeg, 95).unwrap();
        assert!(low.len() < high.len());
    }
}
