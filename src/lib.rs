//! Sonoscope - Image Sonification Engine
//!
//! Turns a grid of pixels into scheduled audio control changes so screen
//! content can be heard:
//! 1. Raster sweep - each row is a pitched voice; brightness drives loudness
//!    and stereo position, then a repeated left-to-right scan plays each
//!    row's horizontal profile
//! 2. HSV timbre - the mean colour becomes a blend of harmonic tone, pure
//!    tone and noise
//!
//! # Architecture
//!
//! - [`image`]: pixel grids, brightness and HSV reduction
//! - [`graph`]: the audio graph contract (timelines, envelopes) and an
//!   in-memory recording implementation
//! - [`encoder`]: the two encoding strategies and sweep scheduling
//! - [`session`]: lifecycle wrapper owning one encoder and its graph

pub mod cli;
pub mod encoder;
pub mod error;
pub mod graph;
pub mod image;
pub mod session;

pub use encoder::{Encoder, HsvConfig, HsvTimbreEncoder, RasterSweepConfig, RasterSweepEncoder};
pub use error::{Result, SonifyError};
pub use graph::{AudioGraph, Envelope, RecordingGraph, Timeline};
pub use image::{ImageGrid, Pixel};
pub use session::{SessionConfig, SonificationSession};
