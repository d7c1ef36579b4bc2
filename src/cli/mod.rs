//! CLI Module
//!
//! Dry-run front end: builds a session over a [`RecordingGraph`] and shows
//! what the encoder schedules, without touching a sound device.
//!
//! [`RecordingGraph`]: crate::graph::RecordingGraph

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sonoscope - hear images as pitch, loudness, timbre and stereo position
#[derive(Parser, Debug)]
#[command(name = "sonoscope")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Present an image and print every scheduled timeline write as JSON
    #[command(name = "present")]
    Present {
        /// Session config (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Image (JSON); omit to render silence
        #[arg(short, long)]
        image: Option<PathBuf>,

        /// Sweep immediately instead of playing a snapshot first
        #[arg(short, long)]
        detailed: bool,
    },

    /// Present an image and print every parameter at the given times
    #[command(name = "sample")]
    Sample {
        /// Session config (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Image (JSON)
        #[arg(short, long)]
        image: PathBuf,

        /// Sweep immediately instead of playing a snapshot first
        #[arg(short, long)]
        detailed: bool,

        /// Seconds after presenting to sample at
        #[arg(long = "at", required = true, num_args = 1..)]
        times: Vec<f64>,
    },

    /// Print the voice table and sweep timing for a config
    #[command(name = "describe")]
    Describe {
        /// Session config (JSON)
        #[arg(short, long)]
        config: PathBuf,
    },
}
