//! Error handling for Sonoscope
//!
//! Configuration and device failures are fatal and surface at construction.
//! Nothing is retried internally: audio scheduling is fire-and-forget, so any
//! retry policy belongs to the host.

use thiserror::Error;

/// Result type alias for Sonoscope operations
pub type Result<T> = std::result::Result<T, SonifyError>;

/// Main error type for Sonoscope operations
#[derive(Error, Debug)]
pub enum SonifyError {
    // Construction Errors
    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    #[error("Audio device unavailable: {reason}")]
    Device { reason: String },

    // Input Errors
    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    // Scheduling Errors
    #[error("Invalid envelope: {reason}")]
    InvalidEnvelope { reason: String },

    #[error("Invalid schedule: {reason}")]
    InvalidSchedule { reason: String },

    #[error("Unknown audio graph node: {node}")]
    UnknownNode { node: String },

    // Lifecycle Errors
    #[error("Session has been shut down")]
    SessionTerminated,

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SonifyError {
    /// Shorthand for a configuration error
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        SonifyError::Configuration {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SonifyError::Configuration { .. } => "CONFIGURATION_ERROR",
            SonifyError::Device { .. } => "DEVICE_ERROR",
            SonifyError::InvalidImage { .. } => "INVALID_IMAGE",
            SonifyError::InvalidEnvelope { .. } => "INVALID_ENVELOPE",
            SonifyError::InvalidSchedule { .. } => "INVALID_SCHEDULE",
            SonifyError::UnknownNode { .. } => "UNKNOWN_NODE",
            SonifyError::SessionTerminated => "SESSION_TERMINATED",
            SonifyError::Io(_) => "IO_ERROR",
            SonifyError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Construction-time failures and a terminated session are not; a bad
    /// image or file can simply be replaced by the host on its next tick.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SonifyError::InvalidImage { .. }
                | SonifyError::Io(_)
                | SonifyError::Serialization(_)
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SonifyError::Configuration { .. } => vec![
                "Width and height must both be at least 1",
                "The low frequency must be positive and below the high frequency",
                "Sweep duration must be positive and sweep delay non-negative",
            ],
            SonifyError::Device { .. } => vec![
                "Check that an audio output device is connected",
                "Close other applications holding the device exclusively",
                "Recreate the session once the device is available",
            ],
            SonifyError::InvalidImage { .. } => vec![
                "Capture the image at the size the session was configured for",
                "Every row must contain the same number of pixels",
            ],
            SonifyError::SessionTerminated => {
                vec!["Create a new session; a shut-down session cannot be reused"]
            }
            _ => vec![],
        }
    }
}
