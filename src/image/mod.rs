//! Image Input
//!
//! The pixel grid handed to the encoders by the host, plus the two colour
//! reductions the encoders need: per-pixel brightness and mean-colour HSV.

mod grid;
mod hsv;
mod pixel;

pub use grid::ImageGrid;
pub use hsv::{rgb_to_hsv, Hsv};
pub use pixel::{luma_brightness, BrightnessFn, Pixel, MAX_BRIGHTNESS};
