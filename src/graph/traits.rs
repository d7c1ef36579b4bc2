//! Audio graph interface
//!
//! The synthesis engine itself lives outside this crate. Encoders only build
//! a fixed set of nodes at construction and then drive their timelines.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Timeline;
use crate::error::Result;

/// Colour of a noise generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseColor {
    White,
    Pink,
    Brown,
}

/// Sound source types the encoders need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// Pure tone
    Sine,
    /// Band-limited sawtooth with a configurable harmonic count
    AdditiveSaw,
    Noise(NoiseColor),
}

/// How a panner turns azimuth into channel gains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanningStrategy {
    /// Plain stereo amplitude law
    Amplitude,
    /// Head-related transfer function
    Hrtf,
}

/// Handle to a generator node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneratorId(pub usize);

/// Handle to a panner node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PannerId(pub usize);

/// Address of one timeline in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "param", content = "node", rename_all = "snake_case")]
pub enum Param {
    Frequency(GeneratorId),
    Amplitude(GeneratorId),
    /// Degrees, -90 (hard left) to 90 (hard right)
    Azimuth(PannerId),
    /// Output level of a panner
    Gain(PannerId),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Frequency(GeneratorId(i)) => write!(f, "generator[{}].frequency", i),
            Param::Amplitude(GeneratorId(i)) => write!(f, "generator[{}].amplitude", i),
            Param::Azimuth(PannerId(i)) => write!(f, "panner[{}].azimuth", i),
            Param::Gain(PannerId(i)) => write!(f, "panner[{}].gain", i),
        }
    }
}

/// A graph of generators and panners feeding one output device
///
/// Panners always feed the output. Generators reach it through any panners
/// they are connected to, or directly via `connect_to_output`.
pub trait AudioGraph {
    fn add_generator(&mut self, kind: GeneratorKind) -> Result<GeneratorId>;

    fn add_panner(&mut self, strategy: PanningStrategy) -> Result<PannerId>;

    /// Route a generator into a panner; a generator may feed several
    fn connect(&mut self, generator: GeneratorId, panner: PannerId) -> Result<()>;

    fn connect_to_output(&mut self, generator: GeneratorId) -> Result<()>;

    /// Borrow the timeline at `param`
    fn timeline(&mut self, param: Param) -> Result<&mut dyn Timeline>;

    /// Harmonic count of an additive generator
    fn set_harmonics(&mut self, generator: GeneratorId, count: u32) -> Result<()>;

    /// Start rendering to the output device
    fn open_output(&mut self) -> Result<()>;

    /// Release the output device; silences everything
    fn close_output(&mut self) -> Result<()>;
}
