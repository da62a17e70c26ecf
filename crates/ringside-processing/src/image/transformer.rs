//! Image transformer - the upload normalization pipeline
//!
//! Every image accepted for storage goes through the same fixed sequence:
//! 1. Decode (JPEG, PNG, GIF, WebP; format guessed from content)
//! 2. EXIF orientation correction
//! 3. Downscale to fit the configured bounds (never upscale)
//! 4. Re-encode into the configured output format and quality
//!
//! Step 4 writes pixels only, so capture device, GPS, timestamps and other
//! embedded metadata of the source file are never persisted.

use crate::compression::{ImageCompressor, WEBP_MAX_DIMENSION};
use crate::error::{ProcessingError, ProcessingResult};
use crate::image::orientation::ImageOrientation;
use crate::image::resize::ImageResize;
use bytes::Bytes;
use image::GenericImageView;
use ringside_core::{ImageConfig, OutputFormat};
use std::io::Cursor;

/// Output of a successful transform
#[derive(Debug, Clone)]
pub struct TransformedImage {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
}

impl TransformedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

/// Fixed-configuration image pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTransformer {
    max_width: u32,
    max_height: u32,
    quality: u8,
    format: OutputFormat,
}

impl ImageTransformer {
    pub fn new(config: &ImageConfig) -> ProcessingResult<Self> {
        if config.max_width == 0 || config.max_height == 0 {
            return Err(ProcessingError::InvalidOptions(
                "maximum dimensions must be greater than zero".to_string(),
            ));
        }
        if !(1..=100).contains(&config.quality) {
            return Err(ProcessingError::InvalidOptions(format!(
                "quality must be between 1 and 100, got {}",
                config.quality
            )));
        }
        if config.output_format == OutputFormat::WebP
            && (config.max_width > WEBP_MAX_DIMENSION || config.max_height > WEBP_MAX_DIMENSION)
        {
            return Err(ProcessingError::InvalidOptions(format!(
                "WebP output is limited to {}px per side",
                WEBP_MAX_DIMENSION
            )));
        }

        Ok(ImageTransformer {
            max_width: config.max_width,
            max_height: config.max_height,
            quality: config.quality,
            format: config.output_format,
        })
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    /// Run the full pipeline over encoded image bytes.
    ///
    /// CPU-bound; async callers should run it on a blocking thread.
    pub fn transform(&self, data: &[u8]) -> ProcessingResult<TransformedImage> {
        let start = std::time::Instant::now();

        let img = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;
        let (source_width, source_height) = img.dimensions();

        let img = ImageOrientation::apply_exif_orientation(img, data);
        let img = ImageResize::fit_within(img, self.max_width, self.max_height);
        let (width, height) = img.dimensions();

        let encoded = ImageCompressor::compress(&img, self.format, self.quality)?;

        tracing::debug!(
            source_width = source_width,
            source_height = source_height,
            width = width,
            height = height,
            format = %self.format,
            input_bytes = data.len(),
            output_bytes = encoded.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Image transformed"
        );

        Ok(TransformedImage {
            data: encoded,
            width,
            height,
            format: self.format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Vec::new();
        let img = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(img.to_rgb8())
        } else {
            img.clone()
        };
        img.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    fn create_test_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255]));
        encode(&DynamicImage::ImageRgba8(img), format)
    }

    /// Left half red, right half blue
    fn split_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        }))
    }

    /// Splice an APP1 EXIF segment carrying only an orientation tag after the JPEG SOI marker
    fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"II*\0");
        tiff.extend_from_slice(&8u32.to_le_bytes());
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&0x0112u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&orientation.to_le_bytes());
        tiff.extend_from_slice(&[0, 0]);
        tiff.extend_from_slice(&0u32.to_le_bytes());

        let segment_len = (2 + 6 + tiff.len()) as u16;
        let mut out = Vec::with_capacity(jpeg.len() + segment_len as usize + 2);
        out.extend_from_slice(&jpeg[..2]);
        out.extend_from_slice(&[0xFF, 0xE1]);
        out.extend_from_slice(&segment_len.to_be_bytes());
        out.extend_from_slice(b"Exif\0\0");
        out.extend_from_slice(&tiff);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    fn transformer(max_width: u32, max_height: u32, format: OutputFormat) -> ImageTransformer {
        ImageTransformer::new(&ImageConfig {
            max_width,
            max_height,
            quality: 80,
            output_format: format,
        })
        .unwrap()
    }

    #[test]
    fn test_default_output_is_webp() {
        let transformer = ImageTransformer::new(&ImageConfig::default()).unwrap();
        let out = transformer
            .transform(&create_test_image(64, 32, ImageFormat::Png))
            .unwrap();

        assert_eq!(out.format, OutputFormat::WebP);
        assert_eq!(out.mime_type(), "image/webp");
        assert_eq!(&out.data[0..4], b"RIFF");
        assert_eq!(&out.data[8..12], b"WEBP");
        assert_eq!((out.width, out.height), (64, 32));
    }

    #[test]
    fn test_small_image_not_upscaled() {
        let out = transformer(1200, 1200, OutputFormat::Png)
            .transform(&create_test_image(100, 50, ImageFormat::Png))
            .unwrap();

        let decoded = image::load_from_memory(&out.data).unwrap();
        assert_eq!(decoded.dimensions(), (100, 50));
    }

    #[test]
    fn test_large_image_bounded() {
        let out = transformer(200, 200, OutputFormat::WebP)
            .transform(&create_test_image(900, 300, ImageFormat::Jpeg))
            .unwrap();

        assert_eq!((out.width, out.height), (200, 67));
        let decoded = image::load_from_memory(&out.data).unwrap();
        assert_eq!(decoded.dimensions(), (200, 67));
    }

    #[test]
    fn test_all_input_formats_converge() {
        let transformer = transformer(50, 50, OutputFormat::Jpeg);
        for format in [
            ImageFormat::Png,
            ImageFormat::Jpeg,
            ImageFormat::Gif,
            ImageFormat::WebP,
        ] {
            let out = transformer
                .transform(&create_test_image(80, 40, format))
                .unwrap();
            assert_eq!(&out.data[0..2], &[0xFF, 0xD8], "input {:?}", format);
            assert_eq!((out.width, out.height), (50, 25));
        }
    }

    #[test]
    fn test_exif_orientation_applied_and_stripped() {
        let jpeg = encode(&split_image(40, 20), ImageFormat::Jpeg);
        let tagged = with_exif_orientation(&jpeg, 6);
        assert_eq!(ImageOrientation::read_exif_orientation(&tagged), 6);

        let out = transformer(1200, 1200, OutputFormat::Jpeg)
            .transform(&tagged)
            .unwrap();
        assert_eq!((out.width, out.height), (20, 40));

        // Rotated 90 degrees clockwise: the red left half is now on top
        let decoded = image::load_from_memory(&out.data).unwrap().to_rgb8();
        let top = decoded.get_pixel(10, 5);
        let bottom = decoded.get_pixel(10, 35);
        assert!(top[0] > 200 && top[2] < 60, "top pixel {:?}", top);
        assert!(
            bottom[2] > 200 && bottom[0] < 60,
            "bottom pixel {:?}",
            bottom
        );

        // No EXIF survives re-encoding
        assert_eq!(ImageOrientation::read_exif_orientation(&out.data), 1);
        assert!(!out.data.windows(6).any(|w| w == b"Exif\0\0"));
    }

    #[test]
    fn test_undecodable_input() {
        let result = transformer(100, 100, OutputFormat::WebP)
            .transform(b"definitely not an image");
        assert!(matches!(result, Err(ProcessingError::Decode(_))));

        let result = transformer(100, 100, OutputFormat::WebP).transform(&[]);
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
    }

    #[test]
    fn test_invalid_options() {
        let invalid = [
            ImageConfig {
                max_width: 0,
                ..ImageConfig::default()
            },
            ImageConfig {
                quality: 0,
                ..ImageConfig::default()
            },
            ImageConfig {
                quality: 101,
                ..ImageConfig::default()
            },
            ImageConfig {
                max_width: 20000,
                ..ImageConfig::default()
            },
        ];
        for config in invalid {
            assert!(matches!(
                ImageTransformer::new(&config),
                Err(ProcessingError::InvalidOptions(_))
            ));
        }

        let png_large = ImageConfig {
            max_width: 20000,
            output_format: OutputFormat::Png,
            ..ImageConfig::default()
        };
        assert!(ImageTransformer::new(&png_large).is_ok());
    }
}
