//! Sonification session
//!
//! Owns one encoder (and through it one audio graph) for its whole life.
//! Callers must serialize calls; `shutdown` is the only teardown path.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::encoder::{
    Encoder, HsvConfig, HsvTimbreEncoder, RasterSweepConfig, RasterSweepEncoder,
};
use crate::error::{Result, SonifyError};
use crate::graph::AudioGraph;
use crate::image::ImageGrid;

/// Which encoder a session runs, with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "encoder", rename_all = "snake_case")]
pub enum SessionConfig {
    RasterSweep(RasterSweepConfig),
    Hsv(HsvConfig),
}

impl SessionConfig {
    /// Parse a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            SessionConfig::RasterSweep(config) => config.validate(),
            SessionConfig::Hsv(config) => config.validate(),
        }
    }

    /// Image `(width, height)` the session expects
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            SessionConfig::RasterSweep(config) => (config.width, config.height),
            SessionConfig::Hsv(config) => (config.width, config.height),
        }
    }

    pub fn encoder_name(&self) -> &'static str {
        match self {
            SessionConfig::RasterSweep(_) => "raster_sweep",
            SessionConfig::Hsv(_) => "hsv",
        }
    }
}

/// Lifecycle wrapper around one encoder
pub struct SonificationSession<G: AudioGraph> {
    id: Uuid,
    encoder: Box<dyn Encoder<G>>,
    terminated: bool,
}

impl<G: AudioGraph + 'static> SonificationSession<G> {
    /// Build the configured encoder on `graph`
    ///
    /// # Errors
    /// Configuration and device failures propagate unchanged.
    pub fn new(config: SessionConfig, graph: G) -> Result<Self> {
        let encoder_name = config.encoder_name();
        let encoder: Box<dyn Encoder<G>> = match config {
            SessionConfig::RasterSweep(config) => {
                Box::new(RasterSweepEncoder::new(config, graph)?)
            }
            SessionConfig::Hsv(config) => Box::new(HsvTimbreEncoder::new(config, graph)?),
        };
        let session = Self::with_encoder(encoder);
        info!(session = %session.id, encoder = encoder_name, "sonification session started");
        Ok(session)
    }
}

impl<G: AudioGraph> SonificationSession<G> {
    /// Wrap an already built encoder
    pub fn with_encoder(encoder: Box<dyn Encoder<G>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            encoder,
            terminated: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Configured image `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        self.encoder.dimensions()
    }

    /// Render a new image, or fade to silence when `image` is `None`
    ///
    /// Returns once every timeline is armed; playback continues in the graph.
    pub fn present(&mut self, image: Option<&ImageGrid>, detailed: bool) -> Result<()> {
        if self.terminated {
            return Err(SonifyError::SessionTerminated);
        }
        debug!(
            session = %self.id,
            has_image = image.is_some(),
            detailed,
            "presenting"
        );
        self.encoder.present(image, detailed)
    }

    /// Fade to silence
    pub fn clear(&mut self) -> Result<()> {
        self.present(None, false)
    }

    /// Silence the encoder and release the device
    ///
    /// Once this succeeds later calls are no-ops. If terminating fails the
    /// session stays live, so the host can retry.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.terminated {
            return Ok(());
        }
        self.encoder.terminate()?;
        self.terminated = true;
        info!(session = %self.id, "sonification session shut down");
        Ok(())
    }

    pub fn graph(&self) -> &G {
        self.encoder.graph()
    }

    pub fn graph_mut(&mut self) -> &mut G {
        self.encoder.graph_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DeviceState, RecordingGraph};
    use crate::image::Pixel;

    fn raster_session() -> SonificationSession<RecordingGraph> {
        let config = SessionConfig::RasterSweep(RasterSweepConfig::new(4, 3));
        SonificationSession::new(config, RecordingGraph::new()).unwrap()
    }

    #[test]
    fn test_config_from_json() {
        let config = SessionConfig::from_json(
            r#"{"encoder": "raster_sweep", "width": 16, "height": 8, "sweep_count": 2}"#,
        )
        .unwrap();
        let SessionConfig::RasterSweep(raster) = &config else {
            panic!("expected raster config, got {:?}", config);
        };
        assert_eq!(raster.sweep_count, 2);
        assert_eq!(raster.low_freq, 500.0);
        assert_eq!(config.dimensions(), (16, 8));

        let hsv = SessionConfig::from_json(r#"{"encoder": "hsv", "width": 2, "height": 2}"#)
            .unwrap();
        assert_eq!(hsv, SessionConfig::Hsv(HsvConfig::new(2, 2)));
    }

    #[test]
    fn test_config_rejects_invalid() {
        let err = SessionConfig::from_json(r#"{"encoder": "hsv", "width": 0, "height": 2}"#)
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");

        let err = SessionConfig::from_json(r#"{"encoder": "fm", "width": 1, "height": 1}"#)
            .unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_present_then_shutdown() {
        let mut session = raster_session();
        let image = ImageGrid::filled(4, 3, Pixel::WHITE).unwrap();
        session.present(Some(&image), false).unwrap();
        session.clear().unwrap();
        session.shutdown().unwrap();
        assert!(session.is_terminated());
        assert_eq!(session.graph().device_state(), DeviceState::Closed);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut session = raster_session();
        session.shutdown().unwrap();
        session.shutdown().unwrap();
    }

    /// Encoder whose first `terminate` fails
    struct FlakyTeardown {
        graph: RecordingGraph,
        failures: usize,
    }

    impl Encoder<RecordingGraph> for FlakyTeardown {
        fn present(&mut self, _image: Option<&ImageGrid>, _detailed: bool) -> Result<()> {
            Ok(())
        }

        fn terminate(&mut self) -> Result<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(SonifyError::Device {
                    reason: "device busy".to_string(),
                });
            }
            Ok(())
        }

        fn dimensions(&self) -> (usize, usize) {
            (1, 1)
        }

        fn graph(&self) -> &RecordingGraph {
            &self.graph
        }

        fn graph_mut(&mut self) -> &mut RecordingGraph {
            &mut self.graph
        }
    }

    #[test]
    fn test_failed_shutdown_can_be_retried() {
        let mut session = SonificationSession::with_encoder(Box::new(FlakyTeardown {
            graph: RecordingGraph::new(),
            failures: 1,
        }));

        let err = session.shutdown().unwrap_err();
        assert_eq!(err.error_code(), "DEVICE_ERROR");
        assert!(!session.is_terminated());
        session.present(None, false).unwrap();

        session.shutdown().unwrap();
        assert!(session.is_terminated());
        session.shutdown().unwrap();
        assert!(session.present(None, false).is_err());
    }

    #[test]
    fn test_present_after_shutdown_fails() {
        let mut session = raster_session();
        session.shutdown().unwrap();
        let err = session.present(None, false).unwrap_err();
        assert!(matches!(err, SonifyError::SessionTerminated));
        assert!(session.clear().is_err());
    }

    #[test]
    fn test_device_error_is_fatal() {
        let config = SessionConfig::Hsv(HsvConfig::new(1, 1));
        let err = SonificationSession::new(config, RecordingGraph::without_device())
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "DEVICE_ERROR");
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        let a = raster_session();
        let b = raster_session();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.dimensions(), (4, 3));
    }
}
