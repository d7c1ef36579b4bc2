//! Sonification Encoders
//!
//! Two strategies turn an image into timeline writes on an [`AudioGraph`]:
//! - [`RasterSweepEncoder`]: one pitched voice per row, stereo snapshot plus
//!   repeated left-to-right sweeps
//! - [`HsvTimbreEncoder`]: the whole image's mean colour as a single blend of
//!   harmonic tone, pure tone and noise
//!
//! Both run synchronously on the caller's thread and return as soon as every
//! timeline is armed; the graph plays the result in its own time.

mod hsv;
mod raster;
mod schedule;

pub use hsv::{perceptual_saturation, HsvConfig, HsvTimbreEncoder, TimbreBlend};
pub use raster::{RasterSweepConfig, RasterSweepEncoder};
pub use schedule::{SweepRepetition, SweepSchedule};

use crate::error::{Result, SonifyError};
use crate::graph::AudioGraph;
use crate::image::ImageGrid;

/// Fade applied when going silent (seconds)
pub const FADE_LENGTH: f64 = 0.05;

/// Pause before every sweep repetition (seconds)
pub const SWEEP_GAP: f64 = 0.2;

/// Peak amplitude of a row voice during a sweep
pub const SWEEP_AMPLITUDE_SCALE: f64 = 0.075;

/// An image-to-audio strategy bound to one audio graph
pub trait Encoder<G: AudioGraph> {
    /// Render `image`, or fall silent when it is `None`
    ///
    /// `detailed` asks for the full sweep straight away instead of a quick
    /// stereo impression first. Strategies without a sweep ignore it.
    fn present(&mut self, image: Option<&ImageGrid>, detailed: bool) -> Result<()>;

    /// Silence the voices and release the output device
    fn terminate(&mut self) -> Result<()>;

    /// Configured image `(width, height)`
    fn dimensions(&self) -> (usize, usize);

    fn graph(&self) -> &G;

    fn graph_mut(&mut self) -> &mut G;
}

/// Reject images whose size differs from the configured one
pub(crate) fn check_dimensions(image: &ImageGrid, width: usize, height: usize) -> Result<()> {
    if image.width() != width || image.height() != height {
        return Err(SonifyError::InvalidImage {
            reason: format!(
                "expected {}x{}, got {}x{}",
                width,
                height,
                image.width(),
                image.height()
            ),
        });
    }
    Ok(())
}

/// Shared construction checks for both encoders
pub(crate) fn validate_common(
    width: usize,
    height: usize,
    low_freq: f64,
    high_freq: f64,
) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(SonifyError::config(format!(
            "width and height must be at least 1, got {}x{}",
            width, height
        )));
    }
    if !(low_freq.is_finite() && high_freq.is_finite()) || low_freq <= 0.0 {
        return Err(SonifyError::config(format!(
            "frequencies must be positive and finite, got {} and {}",
            low_freq, high_freq
        )));
    }
    if low_freq >= high_freq {
        return Err(SonifyError::config(format!(
            "low_freq ({}) must be below high_freq ({})",
            low_freq, high_freq
        )));
    }
    Ok(())
}
