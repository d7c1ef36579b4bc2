//! HSV timbre encoder
//!
//! Reduces a whole image to its mean colour and plays it as one blend of
//! three sources: an additive sawtooth for hue, a pure sine near the top of
//! the range, and brown noise for washed-out content. There is no sweep;
//! every write takes effect immediately.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_dimensions, validate_common, Encoder};
use crate::error::Result;
use crate::graph::{AudioGraph, GeneratorId, GeneratorKind, NoiseColor, Param};
use crate::image::{rgb_to_hsv, Hsv, ImageGrid, MAX_BRIGHTNESS};

/// Hue span (as a fraction of the wheel) of one blend region
const HUE_THIRD: f64 = 0.333;

const HARMONIC_LEVEL: f64 = 0.75;
const PURE_LEVEL: f64 = 0.075;
const NOISE_LEVEL: f64 = 0.4;
const MAX_EXTRA_HARMONICS: f64 = 20.0;

fn default_low_freq() -> f64 {
    90.0
}

fn default_high_freq() -> f64 {
    4000.0
}

/// Construction parameters for [`HsvTimbreEncoder`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HsvConfig {
    pub width: usize,
    pub height: usize,
    #[serde(default = "default_low_freq")]
    pub low_freq: f64,
    #[serde(default = "default_high_freq")]
    pub high_freq: f64,
}

impl HsvConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            low_freq: default_low_freq(),
            high_freq: default_high_freq(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_common(self.width, self.height, self.low_freq, self.high_freq)
    }
}

/// Perceptual saturation: `1 - 10^(1 - s) / 10`
///
/// Concave curve from 0 at `s = 0` to 0.9 at `s = 1`: it rises steeply at
/// first, so even faint colour (`s = 0.1` gives about 0.21) moves the blend
/// away from noise and toward the tones.
pub fn perceptual_saturation(saturation: f64) -> f64 {
    1.0 - 10f64.powf(1.0 - saturation) / 10.0
}

/// Parameter values for the three sources
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimbreBlend {
    pub harmonic_amplitude: f64,
    pub harmonic_frequency: f64,
    pub harmonics: u32,
    pub pure_amplitude: f64,
    pub noise_amplitude: f64,
}

impl TimbreBlend {
    /// Map a colour onto the three sources
    ///
    /// Hue is inverted and split into two weights: `toward_blue` grows across
    /// the green-to-blue range and raises pitch while thinning the harmonic
    /// tone, `toward_red` fades the pure tone out across the red end.
    pub fn from_hsv(hsv: Hsv, low_freq: f64, high_freq: f64) -> Self {
        let saturation = perceptual_saturation(hsv.saturation);
        let value = hsv.value;
        let inverted_hue = 1.0 - hsv.hue;
        let toward_blue = ((inverted_hue - HUE_THIRD) / (2.0 * HUE_THIRD)).clamp(0.0, 1.0);
        let toward_red = (inverted_hue / HUE_THIRD).clamp(0.0, 1.0);

        let richness = (1.0 - (toward_blue - 0.5).abs()) * 2.0 - 1.0;
        Self {
            harmonic_amplitude: value * saturation * toward_red * HARMONIC_LEVEL
                / (1.0 + toward_blue * 10.0),
            harmonic_frequency: low_freq
                * (high_freq / low_freq).powf(2f64.powf(toward_blue) - 1.0),
            harmonics: (1.0 + richness * MAX_EXTRA_HARMONICS).round().max(1.0) as u32,
            pure_amplitude: value * saturation * (1.0 - toward_red) * PURE_LEVEL,
            noise_amplitude: (1.0 - saturation) * value * NOISE_LEVEL,
        }
    }
}

/// Mean-colour timbre encoder
pub struct HsvTimbreEncoder<G: AudioGraph> {
    config: HsvConfig,
    graph: G,
    harmonic: GeneratorId,
    pure: GeneratorId,
    noise: GeneratorId,
}

impl<G: AudioGraph> HsvTimbreEncoder<G> {
    /// Build the three muted sources on `graph` and open its output
    pub fn new(config: HsvConfig, mut graph: G) -> Result<Self> {
        config.validate()?;

        let harmonic = graph.add_generator(GeneratorKind::AdditiveSaw)?;
        graph.timeline(Param::Amplitude(harmonic))?.set_now(0.0)?;
        graph
            .timeline(Param::Frequency(harmonic))?
            .set_now(config.low_freq)?;
        graph.connect_to_output(harmonic)?;

        let pure = graph.add_generator(GeneratorKind::Sine)?;
        graph.timeline(Param::Amplitude(pure))?.set_now(0.0)?;
        graph
            .timeline(Param::Frequency(pure))?
            .set_now(config.high_freq)?;
        graph.connect_to_output(pure)?;

        let noise = graph.add_generator(GeneratorKind::Noise(NoiseColor::Brown))?;
        graph.timeline(Param::Amplitude(noise))?.set_now(0.0)?;
        graph.connect_to_output(noise)?;

        graph.open_output()?;
        debug!(
            low_freq = config.low_freq,
            high_freq = config.high_freq,
            "hsv timbre encoder ready"
        );
        Ok(Self {
            config,
            graph,
            harmonic,
            pure,
            noise,
        })
    }

    pub fn config(&self) -> &HsvConfig {
        &self.config
    }

    /// Additive sawtooth carrying hue
    pub fn harmonic_generator(&self) -> GeneratorId {
        self.harmonic
    }

    pub fn pure_generator(&self) -> GeneratorId {
        self.pure
    }

    pub fn noise_generator(&self) -> GeneratorId {
        self.noise
    }

    /// Mean colour of `image` as HSV; no image reads as black
    pub fn mean_hsv(image: Option<&ImageGrid>) -> Hsv {
        let (r, g, b) = image.map_or((0.0, 0.0, 0.0), ImageGrid::mean_rgb);
        rgb_to_hsv(r / MAX_BRIGHTNESS, g / MAX_BRIGHTNESS, b / MAX_BRIGHTNESS)
    }

    fn apply(&mut self, blend: &TimbreBlend) -> Result<()> {
        self.graph
            .timeline(Param::Amplitude(self.harmonic))?
            .set_now(blend.harmonic_amplitude)?;
        self.graph
            .timeline(Param::Frequency(self.harmonic))?
            .set_now(blend.harmonic_frequency)?;
        self.graph.set_harmonics(self.harmonic, blend.harmonics)?;
        self.graph
            .timeline(Param::Amplitude(self.pure))?
            .set_now(blend.pure_amplitude)?;
        self.graph
            .timeline(Param::Amplitude(self.noise))?
            .set_now(blend.noise_amplitude)
    }
}

impl<G: AudioGraph> Encoder<G> for HsvTimbreEncoder<G> {
    fn present(&mut self, image: Option<&ImageGrid>, _detailed: bool) -> Result<()> {
        if let Some(image) = image {
            check_dimensions(image, self.config.width, self.config.height)?;
        }
        let hsv = Self::mean_hsv(image);
        let blend = TimbreBlend::from_hsv(hsv, self.config.low_freq, self.config.high_freq);
        debug!(?hsv, ?blend, "applying timbre blend");
        self.apply(&blend)
    }

    fn terminate(&mut self) -> Result<()> {
        self.graph.close_output()
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.config.width, self.config.height)
    }

    fn graph(&self) -> &G {
        &self.graph
    }

    fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }
}
