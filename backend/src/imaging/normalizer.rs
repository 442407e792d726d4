use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::error::ApiError;

/// Channel layout every outbound image is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    /// Segmentation input.
    Rgb,
    /// Editing input and its mask.
    Rgba,
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::InvalidImageFormat("Empty image file".to_string()));
    }
    image::load_from_memory(bytes).map_err(|e| ApiError::InvalidImageFormat(e.to_string()))
}

pub fn convert(image: DynamicImage, mode: ChannelMode) -> DynamicImage {
    match (mode, &image) {
        (ChannelMode::Rgb, DynamicImage::ImageRgb8(_))
        | (ChannelMode::Rgba, DynamicImage::ImageRgba8(_)) => image,
        (ChannelMode::Rgb, _) => DynamicImage::ImageRgb8(image.to_rgb8()),
        (ChannelMode::Rgba, _) => DynamicImage::ImageRgba8(image.to_rgba8()),
    }
}

/// Converts to `mode` and encodes as PNG.
pub fn encode_png(image: DynamicImage, mode: ChannelMode) -> Result<Vec<u8>, ApiError> {
    let image = convert(image, mode);
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| ApiError::Internal(format!("PNG encoding failed: {}", e)))?;
    Ok(buffer.into_inner())
}

/// Decodes arbitrary raster bytes and re-encodes them as a PNG in the requested mode.
pub fn normalize(bytes: &[u8], mode: ChannelMode) -> Result<Vec<u8>, ApiError> {
    encode_png(decode(bytes)?, mode)
}

pub fn resize_to_match(mask: DynamicImage, width: u32, height: u32) -> DynamicImage {
    if mask.dimensions() == (width, height) {
        return mask;
    }
    log::debug!(
        "Resizing mask from {:?} to {}x{}",
        mask.dimensions(),
        width,
        height
    );
    mask.resize_exact(width, height, FilterType::Lanczos3)
}
