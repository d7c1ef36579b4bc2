//! Multi-point envelopes
//!
//! An envelope spreads its breakpoints evenly across its duration and is
//! linearly interpolated between neighbours: with `n` points the first sits at
//! `t = 0` and the last at `t = duration`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SonifyError};

/// Raw on-disk form, validated before it becomes an [`Envelope`]
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    duration: f64,
    values: Vec<f64>,
}

/// Evenly spaced breakpoints played over a fixed duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub struct Envelope {
    duration: f64,
    values: Vec<f64>,
}

impl TryFrom<RawEnvelope> for Envelope {
    type Error = SonifyError;

    fn try_from(raw: RawEnvelope) -> Result<Self> {
        Envelope::new(raw.duration, raw.values)
    }
}

impl Envelope {
    /// Create an envelope
    ///
    /// # Errors
    /// `InvalidEnvelope` if there are fewer than 2 breakpoints, any breakpoint
    /// is non-finite, or the duration is not a positive finite number.
    pub fn new(duration: f64, values: Vec<f64>) -> Result<Self> {
        if values.len() < 2 {
            return Err(SonifyError::InvalidEnvelope {
                reason: format!("need at least 2 breakpoints, got {}", values.len()),
            });
        }
        if !(duration.is_finite() && duration > 0.0) {
            return Err(SonifyError::InvalidEnvelope {
                reason: format!("duration must be positive, got {}", duration),
            });
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(SonifyError::InvalidEnvelope {
                reason: format!("breakpoint {} is not finite", bad),
            });
        }
        Ok(Self { duration, values })
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first(&self) -> f64 {
        self.values[0]
    }

    pub fn last(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    /// Interpolated value `elapsed` seconds after the envelope starts
    ///
    /// Clamps to the first value before the start and the last value after
    /// the end.
    pub fn value_at(&self, elapsed: f64) -> f64 {
        if elapsed <= 0.0 {
            return self.first();
        }
        if elapsed >= self.duration {
            return self.last();
        }
        let position = elapsed / self.duration * (self.values.len() - 1) as f64;
        let index = position.floor() as usize;
        let frac = position - index as f64;
        let a = self.values[index];
        let b = self.values[(index + 1).min(self.values.len() - 1)];
        a + (b - a) * frac
    }
}
