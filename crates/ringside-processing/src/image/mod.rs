//! Image processing module
//!
//! - Orientation correction from EXIF metadata (orientation)
//! - Bounded, aspect-preserving downscaling (resize)
//! - The full decode/orient/resize/encode pipeline (transformer)

pub mod orientation;
pub mod resize;
pub mod transformer;

pub use orientation::ImageOrientation;
pub use resize::ImageResize;
pub use transformer::{ImageTransformer, TransformedImage};
