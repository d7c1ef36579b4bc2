//! Sweep scheduling
//!
//! Each repetition first snaps its timeline back to the start value, waits
//! one gap, then plays its envelope. The gap follows the reset of every
//! repetition, so `count` sweeps span `delay + count * (gap + duration)`.

use serde::Serialize;

/// Offsets of one sweep repetition, in seconds from the present call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepRepetition {
    /// When the timeline snaps back to its start value
    pub reset_at: f64,
    /// When the envelope begins
    pub envelope_at: f64,
}

/// `count` sweeps of `duration` seconds, each behind a `gap`, after `delay`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepSchedule {
    pub delay: f64,
    pub duration: f64,
    pub count: usize,
    pub gap: f64,
}

impl SweepSchedule {
    pub fn new(delay: f64, duration: f64, count: usize, gap: f64) -> Self {
        Self {
            delay,
            duration,
            count,
            gap,
        }
    }

    /// Repetition offsets in play order
    pub fn repetitions(&self) -> impl Iterator<Item = SweepRepetition> + '_ {
        (0..self.count).map(move |c| {
            let reset_at = self.delay + c as f64 * (self.gap + self.duration);
            SweepRepetition {
                reset_at,
                envelope_at: reset_at + self.gap,
            }
        })
    }

    /// Time from the call until the last sweep finishes
    pub fn total_span(&self) -> f64 {
        self.delay + self.count as f64 * (self.gap + self.duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_repetition_offsets() {
        let schedule = SweepSchedule::new(0.5, 4.0, 3, 0.2);
        let reps: Vec<_> = schedule.repetitions().collect();
        assert_eq!(reps.len(), 3);
        assert_abs_diff_eq!(reps[0].reset_at, 0.5);
        assert_abs_diff_eq!(reps[0].envelope_at, 0.7);
        assert_abs_diff_eq!(reps[1].envelope_at - reps[0].envelope_at, 4.2, epsilon = 1e-12);
        assert_abs_diff_eq!(reps[2].reset_at, 8.9, epsilon = 1e-12);
    }

    #[test]
    fn test_total_span_includes_every_gap() {
        let schedule = SweepSchedule::new(0.5, 4.0, 4, 0.2);
        assert_abs_diff_eq!(schedule.total_span(), 0.5 + 4.0 * 4.2, epsilon = 1e-12);
        assert_abs_diff_eq!(SweepSchedule::new(1.0, 4.0, 0, 0.2).total_span(), 1.0);
    }
}
