//! Row-major pixel grid
//!
//! Dimensions are fixed once built; every row has exactly `width` pixels.

use serde::{Deserialize, Serialize};

use super::Pixel;
use crate::error::{Result, SonifyError};

/// Raw on-disk form, validated before it becomes an [`ImageGrid`]
#[derive(Debug, Deserialize)]
struct RawGrid {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

/// Rectangular grid of RGB pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct ImageGrid {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl TryFrom<RawGrid> for ImageGrid {
    type Error = SonifyError;

    fn try_from(raw: RawGrid) -> Result<Self> {
        ImageGrid::new(raw.width, raw.height, raw.pixels)
    }
}

fn pixel_count(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .ok_or_else(|| SonifyError::InvalidImage {
            reason: format!("{}x{} image is too large to address", width, height),
        })
}

impl ImageGrid {
    /// Build a grid from row-major pixels
    ///
    /// # Errors
    /// `InvalidImage` if either dimension is 0 or the pixel count is not
    /// `width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(SonifyError::InvalidImage {
                reason: format!("dimensions must be non-zero, got {}x{}", width, height),
            });
        }
        let count = pixel_count(width, height)?;
        if pixels.len() != count {
            return Err(SonifyError::InvalidImage {
                reason: format!(
                    "expected {} pixels for {}x{}, got {}",
                    count,
                    width,
                    height,
                    pixels.len()
                ),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a grid from a list of rows, rejecting ragged input
    pub fn from_rows(rows: Vec<Vec<Pixel>>) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some(y) = rows.iter().position(|row| row.len() != width) {
            return Err(SonifyError::InvalidImage {
                reason: format!(
                    "row {} has {} pixels, expected {}",
                    y,
                    rows[y].len(),
                    width
                ),
            });
        }
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    /// Grid with every pixel set to `px`
    pub fn filled(width: usize, height: usize, px: Pixel) -> Result<Self> {
        let count = pixel_count(width, height)?;
        Self::new(width, height, vec![px; count])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixels of row `y`, top row first
    ///
    /// # Panics
    /// If `y >= height`.
    pub fn row(&self, y: usize) -> &[Pixel] {
        let start = y * self.width;
        &self.pixels[start..start + self.width]
    }

    /// Iterate rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        self.pixels.chunks_exact(self.width)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn set(&mut self, x: usize, y: usize, px: Pixel) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(SonifyError::InvalidImage {
                reason: format!(
                    "({}, {}) is outside {}x{}",
                    x, y, self.width, self.height
                ),
            });
        }
        self.pixels[y * self.width + x] = px;
        Ok(())
    }

    /// Mean red, green and blue over every pixel, each in `[0, 255]`
    pub fn mean_rgb(&self) -> (f64, f64, f64) {
        let (r, g, b) = self.pixels.iter().fold((0u64, 0u64, 0u64), |acc, px| {
            (
                acc.0 + u64::from(px.red),
                acc.1 + u64::from(px.green),
                acc.2 + u64::from(px.blue),
            )
        });
        let n = self.pixels.len() as f64;
        (r as f64 / n, g as f64 / n, b as f64 / n)
    }
}
