use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Aspect-preserving downscaling
pub struct ImageResize;

impl ImageResize {
    /// Fit an image inside `max_width` x `max_height`.
    ///
    /// Images already within bounds are returned untouched; larger images are
    /// scaled down so that both sides fit. Never upscales.
    pub fn fit_within(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
        let (width, height) = img.dimensions();
        let (target_width, target_height) =
            Self::bounded_dimensions(width, height, max_width, max_height);

        if (target_width, target_height) == (width, height) {
            return img;
        }

        tracing::debug!(
            from_width = width,
            from_height = height,
            to_width = target_width,
            to_height = target_height,
            "Downscaling image"
        );

        img.resize_exact(
            target_width,
            target_height,
            Self::select_filter(width, target_width),
        )
    }

    /// Compute the dimensions `fit_within` will produce.
    pub fn bounded_dimensions(
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    ) -> (u32, u32) {
        if width <= max_width && height <= max_height {
            return (width, height);
        }

        let (w, h) = (width as u64, height as u64);
        let (max_w, max_h) = (max_width.max(1) as u64, max_height.max(1) as u64);

        // Compare w/max_w against h/max_h without floats; the larger ratio constrains.
        let (new_w, new_h) = if w * max_h >= h * max_w {
            (max_w, ((h * max_w + w / 2) / w).max(1))
        } else {
            (((w * max_h + h / 2) / h).max(1), max_h)
        };

        (new_w.min(max_w) as u32, new_h.min(max_h) as u32)
    }

    /// Choose a resampling filter for the given scale factor
    pub fn select_filter(from: u32, to: u32) -> FilterType {
        // Heavy reductions gain little from Lanczos and cost a lot
        if to.saturating_mul(4) < from {
            FilterType::Triangle
        } else {
            FilterType::Lanczos3
        }
    }
}
