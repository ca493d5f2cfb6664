//! Image processing module
//!
//! Decoding helpers and the downscale-only resize used for thumbnails.

pub mod resize;

pub use resize::{scaled_width, shrink_to_height};
