//! Downscale-only, aspect-preserving resize.

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Width that preserves the aspect ratio at `target_height`, rounded to the
/// nearest integer (minimum 1).
pub fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    let scaled = (target_height as f64) * (width as f64) / (height as f64);
    (scaled.round() as u32).max(1)
}

/// Scale `img` down so its height equals `target_height`, preserving aspect
/// ratio. Images at or below the target height are returned unchanged; this
/// never upscales. Lanczos3 is used unconditionally so identical inputs
/// produce identical output.
pub fn shrink_to_height(img: DynamicImage, target_height: u32) -> DynamicImage {
    let (width, height) = img.dimensions();

    if height <= target_height {
        return img;
    }

    let target_width = scaled_width(width, height, target_height);
    img.resize_exact(target_width, target_height, FilterType::Lanczos3)
}
