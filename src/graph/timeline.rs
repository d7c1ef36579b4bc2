//! Timeline contract and automation evaluation
//!
//! A timeline is one scalar control (frequency, amplitude, azimuth, gain) on a
//! node. Scheduled writes never cancel each other; the only way to drop queued
//! automation is `set_now`, which pins the value and discards everything still
//! pending. Re-arming (`arm_baseline`) is `set_now` with the value currently
//! sounding, and is the cancellation strategy used on every new image.

use serde::Serialize;

use super::Envelope;
use crate::error::{Result, SonifyError};

/// A schedulable, time-addressed scalar control parameter
///
/// Offsets and durations are in seconds relative to the moment of the call.
pub trait Timeline {
    /// Value sounding right now
    fn value(&self) -> f64;

    /// Pin the value immediately and discard all pending automation
    fn set_now(&mut self, value: f64) -> Result<()>;

    /// Jump to `value` once `offset` seconds have elapsed
    fn set_at(&mut self, offset: f64, value: f64) -> Result<()>;

    /// Move linearly from the current value to `value` over `duration`
    fn ramp_to(&mut self, value: f64, duration: f64) -> Result<()>;

    /// Play `envelope` starting `offset` seconds from now
    fn play_envelope(&mut self, offset: f64, envelope: &Envelope) -> Result<()>;

    /// Freeze the value sounding now as the start point for new automation
    ///
    /// Anything scheduled by an earlier call and not yet reached is dropped,
    /// so following ramps start from what is actually audible.
    fn arm_baseline(&mut self) -> Result<f64> {
        let current = self.value();
        self.set_now(current)?;
        Ok(current)
    }
}

/// A write queued on a timeline, stamped in absolute seconds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduledEvent {
    Set { at: f64, value: f64 },
    Ramp { at: f64, duration: f64, target: f64 },
    Envelope { at: f64, envelope: Envelope },
}

impl ScheduledEvent {
    /// Absolute start time
    pub fn start(&self) -> f64 {
        match self {
            ScheduledEvent::Set { at, .. }
            | ScheduledEvent::Ramp { at, .. }
            | ScheduledEvent::Envelope { at, .. } => *at,
        }
    }

    /// Absolute time after which the event holds a constant value
    pub fn end(&self) -> f64 {
        match self {
            ScheduledEvent::Set { at, .. } => *at,
            ScheduledEvent::Ramp { at, duration, .. } => at + duration,
            ScheduledEvent::Envelope { at, envelope } => at + envelope.duration(),
        }
    }

    /// Value at absolute time `t`, given the value `from` sounding at start
    fn evaluate(&self, from: f64, t: f64) -> f64 {
        match self {
            ScheduledEvent::Set { value, .. } => *value,
            ScheduledEvent::Ramp {
                at,
                duration,
                target,
            } => {
                if *duration <= 0.0 {
                    return *target;
                }
                let frac = ((t - at) / duration).clamp(0.0, 1.0);
                from + (target - from) * frac
            }
            ScheduledEvent::Envelope { at, envelope } => envelope.value_at(t - at),
        }
    }
}

/// Baseline value plus the queue of writes scheduled after it
///
/// At any instant the active target is the latest event whose start has
/// passed; a ramp starts from whatever the previous target produced at the
/// ramp's own start time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Automation {
    anchor: f64,
    baseline: f64,
    events: Vec<ScheduledEvent>,
}

impl Automation {
    pub fn new(value: f64) -> Self {
        Self {
            anchor: 0.0,
            baseline: value,
            events: Vec::new(),
        }
    }

    /// Pin `value` at time `now`, dropping every queued event
    pub fn reset(&mut self, now: f64, value: f64) {
        self.anchor = now;
        self.baseline = value;
        self.events.clear();
    }

    /// Queue an event; events with equal start keep issue order
    pub fn schedule(&mut self, event: ScheduledEvent) {
        let start = event.start();
        let index = self.events.partition_point(|e| e.start() <= start);
        self.events.insert(index, event);
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Time the baseline was pinned
    pub fn anchor(&self) -> f64 {
        self.anchor
    }

    pub fn events(&self) -> &[ScheduledEvent] {
        &self.events
    }

    /// Value at absolute time `t`
    pub fn value_at(&self, t: f64) -> f64 {
        let mut active: Option<(&ScheduledEvent, f64)> = None;
        for event in self.events.iter().take_while(|e| e.start() <= t) {
            let from = match active {
                Some((prev, prev_from)) => prev.evaluate(prev_from, event.start()),
                None => self.baseline,
            };
            active = Some((event, from));
        }
        match active {
            Some((event, from)) => event.evaluate(from, t),
            None => self.baseline,
        }
    }
}

pub(crate) fn check_value(what: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SonifyError::InvalidSchedule {
            reason: format!("{} must be finite, got {}", what, value),
        })
    }
}

pub(crate) fn check_offset(what: &str, offset: f64) -> Result<()> {
    check_value(what, offset)?;
    if offset < 0.0 {
        return Err(SonifyError::InvalidSchedule {
            reason: format!("{} must not be negative, got {}", what, offset),
        });
    }
    Ok(())
}
