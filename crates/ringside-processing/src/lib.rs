//! Ringside Processing Library
//!
//! Normalizes uploaded images before they are persisted: EXIF orientation is
//! applied, the image is bounded to a maximum size without upscaling and then
//! re-encoded into a single output format. Re-encoding drops every embedded
//! metadata block (camera, GPS, timestamps) of the original file.

pub mod compression;
pub mod error;
pub mod image;

pub use self::image::{ImageOrientation, ImageResize, ImageTransformer, TransformedImage};
pub use compression::ImageCompressor;
pub use error::{ProcessingError, ProcessingResult};
pub use ringside_core::OutputFormat;
