//! Pixel type and brightness weighting

use serde::{Deserialize, Serialize};

/// Upper bound of a channel and of any brightness value
pub const MAX_BRIGHTNESS: f64 = 255.0;

/// Brightness function injected into the raster encoder.
///
/// Must return a value in `[0, MAX_BRIGHTNESS]`.
pub type BrightnessFn = fn(&Pixel) -> f64;

/// One RGB pixel, 0-255 per channel
///
/// Serializes as a bare `[r, g, b]` triple so image files stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Pixel {
    pub const BLACK: Pixel = Pixel::new(0, 0, 0);
    pub const WHITE: Pixel = Pixel::new(255, 255, 255);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Grey pixel with all channels equal
    pub const fn grey(level: u8) -> Self {
        Self::new(level, level, level)
    }
}

impl From<[u8; 3]> for Pixel {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self { red, green, blue }
    }
}

impl From<Pixel> for [u8; 3] {
    fn from(px: Pixel) -> Self {
        [px.red, px.green, px.blue]
    }
}

/// Default brightness: Rec.601 luma, in `[0, 255]`
pub fn luma_brightness(px: &Pixel) -> f64 {
    0.299 * f64::from(px.red) + 0.587 * f64::from(px.green) + 0.114 * f64::from(px.blue)
}
