//! Utility functions for images.

mod image;

pub use image::{crop_box, decode_base64_image, dynamic_to_rgb, encode_png_data_uri, load_image};
