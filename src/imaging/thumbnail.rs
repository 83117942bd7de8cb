//! Preview and thumbnail sizing.

use image::imageops::FilterType;
use image::DynamicImage;

/// Bounding box for the approval preview.
pub const PREVIEW_MAX: (u32, u32) = (760, 450);

/// Bounding box for the "last screenshot" thumbnail.
pub const THUMBNAIL_MAX: (u32, u32) = (200, 150);

/// Dimensions that fit `(width, height)` inside `(max_width, max_height)`.
///
/// Keeps aspect ratio, never upscales, never returns a zero side.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width.max(1), height.max(1));
    }
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let ratio = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let new_width = ((width as f64 * ratio).round() as u32).clamp(1, max_width.max(1));
    let new_height = ((height as f64 * ratio).round() as u32).clamp(1, max_height.max(1));
    (new_width, new_height)
}

/// Resize `image` to fit the given box with Lanczos resampling.
pub fn fit_within(image: &DynamicImage, max: (u32, u32)) -> DynamicImage {
    let (width, height) = fit_dimensions(image.width(), image.height(), max.0, max.1);
    if (width, height) == (image.width(), image.height()) {
        return image.clone();
    }
    image.resize_exact(width, height, FilterType::Lanczos3)
}
