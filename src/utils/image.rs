//! Utility functions for image handling.
//!
//! This module provides the image plumbing the pipeline needs: loading
//! and decoding source mockups, cropping detected regions, and encoding
//! crops as inline PNG data URIs for embedding in the card document.

use crate::core::{CardGenError, CardResult};
use crate::processors::BoundingBox;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, RgbImage};
use std::io::Cursor;

/// Converts a DynamicImage to an RgbImage.
pub fn dynamic_to_rgb(img: DynamicImage) -> RgbImage {
    img.to_rgb8()
}

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns `CardGenError::ImageLoad` if the image cannot be loaded or
/// decoded.
pub fn load_image(path: &std::path::Path) -> CardResult<RgbImage> {
    let img = image::open(path).map_err(CardGenError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Decodes a base64-encoded image, enforcing the configured upload limit.
///
/// # Arguments
///
/// * `b64` - The base64-encoded image bytes.
/// * `max_bytes` - Maximum accepted size of the decoded image in bytes.
pub fn decode_base64_image(b64: &str, max_bytes: usize) -> CardResult<RgbImage> {
    let bytes = BASE64
        .decode(b64.trim())
        .map_err(|e| CardGenError::invalid_input(format!("invalid base64 image: {e}")))?;

    if bytes.len() > max_bytes {
        return Err(CardGenError::resource_limit_error(
            "image upload",
            max_bytes,
            bytes.len(),
        ));
    }

    let img = image::load_from_memory(&bytes).map_err(CardGenError::ImageLoad)?;
    Ok(dynamic_to_rgb(img))
}

/// Crops a bounding box region out of an image.
///
/// Coordinates are clamped to the image bounds; the minimum corner is
/// truncated and the extent rounded up so the crop covers the full box.
///
/// # Errors
///
/// Returns `CardGenError::InvalidInput` when the clamped region is empty.
pub fn crop_box(image: &RgbImage, bbox: &BoundingBox) -> CardResult<RgbImage> {
    let (img_width, img_height) = image.dimensions();

    let x = bbox.x_min().max(0.0).floor() as u32;
    let y = bbox.y_min().max(0.0).floor() as u32;
    let x_end = (bbox.x_max().ceil() as u32).min(img_width);
    let y_end = (bbox.y_max().ceil() as u32).min(img_height);

    if x >= x_end || y >= y_end {
        return Err(CardGenError::invalid_input(format!(
            "crop region [{}, {}, {}, {}] is empty for a {}x{} image",
            bbox.x_min(),
            bbox.y_min(),
            bbox.x_max(),
            bbox.y_max(),
            img_width,
            img_height
        )));
    }

    Ok(image::imageops::crop_imm(image, x, y, x_end - x, y_end - y).to_image())
}

/// Encodes an image as a PNG data URI suitable for inline embedding.
pub fn encode_png_data_uri(image: &RgbImage) -> CardResult<String> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(CardGenError::ImageLoad)?;

    Ok(format!("data:image/png;base64,{}", BASE64.encode(&bytes)))
}
