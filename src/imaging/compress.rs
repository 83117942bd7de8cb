//! Upload compression — functional core.
//!
//! No infrastructure dependencies: pixels in, PNG bytes out.

use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::DynamicImage;

/// Encoded PNGs larger than this are downscaled once before upload (~1 MB).
pub const UPLOAD_SIZE_LIMIT: usize = 1000 * 1024;

/// Linear scale factor for the single downscale pass.
pub const DOWNSCALE_RATIO: f64 = 0.75;

/// A PNG ready to send, plus what it was made from.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
    pub downscaled: bool,
}

impl EncodedImage {
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }
}

/// Encode as PNG with the strongest compression the encoder offers.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, EncodeError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EncodeError::ZeroDimension);
    }

    let mut png_bytes: Vec<u8> = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut png_bytes, CompressionType::Best, PngFilter::Adaptive);
    image
        .write_with_encoder(encoder)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(png_bytes)
}

/// Scale both dimensions by `ratio`, never below 1px.
pub fn downscale(image: &DynamicImage, ratio: f64) -> DynamicImage {
    let width = ((image.width() as f64 * ratio).round() as u32).max(1);
    let height = ((image.height() as f64 * ratio).round() as u32).max(1);
    image.resize_exact(width, height, FilterType::Lanczos3)
}

/// Encode for upload with the default ~1 MB limit.
pub fn compress_for_upload(image: &DynamicImage) -> Result<EncodedImage, EncodeError> {
    compress_with_limit(image, UPLOAD_SIZE_LIMIT)
}

/// Encode; if the result exceeds `limit` bytes, downscale once and re-encode.
///
/// There is exactly one retry. The second encoding is returned even when it
/// is still over the limit.
pub fn compress_with_limit(image: &DynamicImage, limit: usize) -> Result<EncodedImage, EncodeError> {
    let (source_width, source_height) = (image.width(), image.height());
    let png = encode_png(image)?;
    log::info!("[IMAGE] Compressed image size: {:.2} KB", png.len() as f64 / 1024.0);

    if png.len() <= limit {
        return Ok(EncodedImage {
            png,
            width: source_width,
            height: source_height,
            source_width,
            source_height,
            downscaled: false,
        });
    }

    let resized = downscale(image, DOWNSCALE_RATIO);
    let png = encode_png(&resized)?;
    log::info!(
        "[IMAGE] Resized to {}x{}, compressed size: {:.2} KB",
        resized.width(),
        resized.height(),
        png.len() as f64 / 1024.0
    );

    Ok(EncodedImage {
        png,
        width: resized.width(),
        height: resized.height(),
        source_width,
        source_height,
        downscaled: true,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Image has zero width or height")]
    ZeroDimension,

    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}
