//! CLI Command Implementations
//!
//! Each command has a pure helper that builds its output, and a thin
//! wrapper that prints it.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::encoder::{SweepSchedule, SWEEP_GAP};
use crate::error::Result;
use crate::graph::RecordingGraph;
use crate::image::ImageGrid;
use crate::session::{SessionConfig, SonificationSession};

/// Load an image JSON file
pub fn load_image(path: &Path) -> Result<ImageGrid> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn run_session(
    config: SessionConfig,
    image: Option<&ImageGrid>,
    detailed: bool,
) -> Result<SonificationSession<RecordingGraph>> {
    let mut session = SonificationSession::new(config, RecordingGraph::new())?;
    // only the writes made by this present call are of interest
    session.graph_mut().clear_ops();
    session.present(image, detailed)?;
    Ok(session)
}

/// JSON log of every write made by presenting `image`
pub fn present_report(
    config: SessionConfig,
    image: Option<&ImageGrid>,
    detailed: bool,
) -> Result<String> {
    let mut session = run_session(config, image, detailed)?;
    let json = serde_json::to_string_pretty(&session.graph().report())?;
    session.shutdown()?;
    Ok(json)
}

/// Values of one parameter at one moment
#[derive(Debug, Clone, Serialize)]
pub struct ParamSample {
    pub at: f64,
    pub param: String,
    pub value: f64,
}

/// Sample every parameter at each of `times`
pub fn sample_params(
    config: SessionConfig,
    image: &ImageGrid,
    detailed: bool,
    times: &[f64],
) -> Result<Vec<ParamSample>> {
    let mut session = run_session(config, Some(image), detailed)?;
    let graph = session.graph();
    let start = graph.now();
    let mut samples = Vec::with_capacity(times.len() * graph.params().len());
    for &at in times {
        for param in graph.params() {
            samples.push(ParamSample {
                at,
                param: param.to_string(),
                value: graph.value_at(param, start + at)?,
            });
        }
    }
    session.shutdown()?;
    Ok(samples)
}

/// Voice table and timing summary
pub fn describe_config(config: &SessionConfig) -> Vec<String> {
    let mut lines = Vec::new();
    match config {
        SessionConfig::RasterSweep(raster) => {
            lines.push(format!(
                "raster sweep: {}x{}, {:.2} octaves from {} Hz",
                raster.width,
                raster.height,
                raster.octave_count(),
                raster.low_freq
            ));
            for y in 0..raster.height {
                let slot = raster.height - 1 - y;
                lines.push(format!(
                    "  row {:>3} -> slot {:>3}: {:>9.2} Hz",
                    y,
                    slot,
                    raster.slot_frequency(slot)
                ));
            }
            let schedule = SweepSchedule::new(
                raster.sweep_delay,
                raster.sweep_duration,
                raster.sweep_count,
                SWEEP_GAP,
            );
            lines.push(format!(
                "  {} sweeps of {}s, done {:.2}s after a snapshot ({:.2}s when detailed)",
                raster.sweep_count,
                raster.sweep_duration,
                schedule.total_span(),
                schedule.total_span() - raster.sweep_delay
            ));
        }
        SessionConfig::Hsv(hsv) => {
            lines.push(format!(
                "hsv timbre: {}x{}, harmonic tone {}-{} Hz, pure tone at {} Hz",
                hsv.width, hsv.height, hsv.low_freq, hsv.high_freq, hsv.high_freq
            ));
        }
    }
    lines
}

/// Print the write log for one present call.
pub fn present(config: &Path, image: Option<&Path>, detailed: bool) -> Result<()> {
    info!("Presenting with config: {}", config.display());

    let session_config = SessionConfig::load(config)?;
    let image = image.map(load_image).transpose()?;
    let json = present_report(session_config, image.as_ref(), detailed)?;
    println!("{}", json);

    Ok(())
}

/// Print parameter values at the requested times.
pub fn sample(config: &Path, image: &Path, detailed: bool, times: &[f64]) -> Result<()> {
    info!("Sampling {} at {} time(s)", image.display(), times.len());

    let session_config = SessionConfig::load(config)?;
    let image = load_image(image)?;
    let samples = sample_params(session_config, &image, detailed, times)?;

    println!("{:>8}  {:<28} {:>12}", "time", "parameter", "value");
    println!("{:-<52}", "");
    for sample in samples {
        println!("{:>8.3}  {:<28} {:>12.6}", sample.at, sample.param, sample.value);
    }

    Ok(())
}

/// Print the voice table for a config.
pub fn describe(config: &Path) -> Result<()> {
    let session_config = SessionConfig::load(config)?;
    for line in describe_config(&session_config) {
        println!("{}", line);
    }
    Ok(())
}
