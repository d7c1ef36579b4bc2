//! In-memory audio graph
//!
//! `RecordingGraph` realizes the [`AudioGraph`] contract without a sound
//! device. It keeps a virtual clock, the pending automation of every timeline
//! and a log of every write, so callers can ask what any parameter would be
//! doing at any moment. Used by the CLI dry-run commands and by tests.

use serde::Serialize;
use tracing::debug;

use super::timeline::{check_offset, check_value};
use super::{
    Automation, AudioGraph, Envelope, GeneratorId, GeneratorKind, PannerId, PanningStrategy,
    Param, ScheduledEvent, Timeline,
};
use crate::error::{Result, SonifyError};

const DEFAULT_FREQUENCY: f64 = 440.0;

/// One write issued on a timeline, as the caller expressed it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TimelineOp {
    SetNow { value: f64 },
    SetAt { offset: f64, value: f64 },
    RampTo { value: f64, duration: f64 },
    PlayEnvelope { offset: f64, envelope: Envelope },
}

/// A logged write with the virtual time it was issued at
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedOp {
    pub issued_at: f64,
    #[serde(flatten)]
    pub op: TimelineOp,
}

/// Timeline backed by an [`Automation`] queue
#[derive(Debug, Clone, Serialize)]
pub struct RecordedTimeline {
    #[serde(skip)]
    now: f64,
    automation: Automation,
    ops: Vec<LoggedOp>,
}

impl RecordedTimeline {
    fn new(value: f64) -> Self {
        Self {
            now: 0.0,
            automation: Automation::new(value),
            ops: Vec::new(),
        }
    }

    fn log(&mut self, op: TimelineOp) {
        self.ops.push(LoggedOp {
            issued_at: self.now,
            op,
        });
    }

    /// Value at absolute virtual time `t`
    pub fn value_at(&self, t: f64) -> f64 {
        self.automation.value_at(t)
    }

    /// Events still queued since the last `set_now`
    pub fn pending(&self) -> &[ScheduledEvent] {
        self.automation.events()
    }

    /// Every write ever issued, oldest first
    pub fn ops(&self) -> &[LoggedOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }
}

impl Timeline for RecordedTimeline {
    fn value(&self) -> f64 {
        self.automation.value_at(self.now)
    }

    fn set_now(&mut self, value: f64) -> Result<()> {
        check_value("value", value)?;
        self.automation.reset(self.now, value);
        self.log(TimelineOp::SetNow { value });
        Ok(())
    }

    fn set_at(&mut self, offset: f64, value: f64) -> Result<()> {
        check_offset("offset", offset)?;
        check_value("value", value)?;
        self.automation.schedule(ScheduledEvent::Set {
            at: self.now + offset,
            value,
        });
        self.log(TimelineOp::SetAt { offset, value });
        Ok(())
    }

    fn ramp_to(&mut self, value: f64, duration: f64) -> Result<()> {
        check_offset("ramp duration", duration)?;
        check_value("value", value)?;
        self.automation.schedule(ScheduledEvent::Ramp {
            at: self.now,
            duration,
            target: value,
        });
        self.log(TimelineOp::RampTo { value, duration });
        Ok(())
    }

    fn play_envelope(&mut self, offset: f64, envelope: &Envelope) -> Result<()> {
        check_offset("offset", offset)?;
        self.automation.schedule(ScheduledEvent::Envelope {
            at: self.now + offset,
            envelope: envelope.clone(),
        });
        self.log(TimelineOp::PlayEnvelope {
            offset,
            envelope: envelope.clone(),
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
struct GeneratorNode {
    kind: GeneratorKind,
    frequency: RecordedTimeline,
    amplitude: RecordedTimeline,
    harmonics: u32,
    panners: Vec<PannerId>,
    to_output: bool,
}

#[derive(Debug, Clone, Serialize)]
struct PannerNode {
    strategy: PanningStrategy,
    azimuth: RecordedTimeline,
    gain: RecordedTimeline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    Closed,
    Open,
    /// Opening always fails
    Unavailable,
}

/// Per-timeline dump used by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct TimelineReport<'a> {
    pub param: String,
    pub value_now: f64,
    pub ops: &'a [LoggedOp],
}

/// Audio graph that records instead of rendering
#[derive(Debug, Clone, Serialize)]
pub struct RecordingGraph {
    now: f64,
    device: DeviceState,
    generators: Vec<GeneratorNode>,
    panners: Vec<PannerNode>,
}

impl Default for RecordingGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingGraph {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            device: DeviceState::Closed,
            generators: Vec::new(),
            panners: Vec::new(),
        }
    }

    /// Graph whose output device can never be opened
    pub fn without_device() -> Self {
        Self {
            device: DeviceState::Unavailable,
            ..Self::new()
        }
    }

    /// Current virtual time in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the virtual clock forward; negative steps are ignored
    pub fn advance(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.now += seconds;
        }
        let now = self.now;
        for timeline in self.timelines_mut() {
            timeline.now = now;
        }
    }

    pub fn device_state(&self) -> DeviceState {
        self.device
    }

    pub fn generator_count(&self) -> usize {
        self.generators.len()
    }

    pub fn panner_count(&self) -> usize {
        self.panners.len()
    }

    pub fn generator_kind(&self, id: GeneratorId) -> Result<GeneratorKind> {
        Ok(self.generator(id)?.kind)
    }

    pub fn harmonics(&self, id: GeneratorId) -> Result<u32> {
        Ok(self.generator(id)?.harmonics)
    }

    /// Panners a generator feeds
    pub fn connections(&self, id: GeneratorId) -> Result<&[PannerId]> {
        Ok(&self.generator(id)?.panners)
    }

    pub fn feeds_output(&self, id: GeneratorId) -> Result<bool> {
        Ok(self.generator(id)?.to_output)
    }

    pub fn panner_strategy(&self, id: PannerId) -> Result<PanningStrategy> {
        Ok(self.panner(id)?.strategy)
    }

    /// Read-only view of a timeline
    pub fn recorded(&self, param: Param) -> Result<&RecordedTimeline> {
        let unknown = || SonifyError::UnknownNode {
            node: param.to_string(),
        };
        match param {
            Param::Frequency(id) => self.generators.get(id.0).map(|g| &g.frequency),
            Param::Amplitude(id) => self.generators.get(id.0).map(|g| &g.amplitude),
            Param::Azimuth(id) => self.panners.get(id.0).map(|p| &p.azimuth),
            Param::Gain(id) => self.panners.get(id.0).map(|p| &p.gain),
        }
        .ok_or_else(unknown)
    }

    /// Value of `param` at absolute virtual time `t`
    pub fn value_at(&self, param: Param, t: f64) -> Result<f64> {
        Ok(self.recorded(param)?.value_at(t))
    }

    /// Value of `param` at the current virtual time
    pub fn value_now(&self, param: Param) -> Result<f64> {
        self.value_at(param, self.now)
    }

    /// Forget logged writes; pending automation is untouched
    pub fn clear_ops(&mut self) {
        for timeline in self.timelines_mut() {
            timeline.clear_ops();
        }
    }

    /// Address of every timeline, generators first
    pub fn params(&self) -> Vec<Param> {
        let generator_params = (0..self.generators.len()).flat_map(|i| {
            [
                Param::Frequency(GeneratorId(i)),
                Param::Amplitude(GeneratorId(i)),
            ]
        });
        let panner_params = (0..self.panners.len())
            .flat_map(|i| [Param::Azimuth(PannerId(i)), Param::Gain(PannerId(i))]);
        generator_params.chain(panner_params).collect()
    }

    /// Every timeline with its log, generators first
    pub fn report(&self) -> Vec<TimelineReport<'_>> {
        self.params()
            .into_iter()
            .filter_map(|param| {
                let timeline = self.recorded(param).ok()?;
                Some(TimelineReport {
                    param: param.to_string(),
                    value_now: timeline.value_at(self.now),
                    ops: timeline.ops(),
                })
            })
            .collect()
    }

    fn generator(&self, id: GeneratorId) -> Result<&GeneratorNode> {
        self.generators
            .get(id.0)
            .ok_or_else(|| SonifyError::UnknownNode {
                node: format!("generator[{}]", id.0),
            })
    }

    fn generator_mut(&mut self, id: GeneratorId) -> Result<&mut GeneratorNode> {
        self.generators
            .get_mut(id.0)
            .ok_or_else(|| SonifyError::UnknownNode {
                node: format!("generator[{}]", id.0),
            })
    }

    fn panner(&self, id: PannerId) -> Result<&PannerNode> {
        self.panners.get(id.0).ok_or_else(|| SonifyError::UnknownNode {
            node: format!("panner[{}]", id.0),
        })
    }

    fn timelines_mut(&mut self) -> impl Iterator<Item = &mut RecordedTimeline> {
        let generators = self
            .generators
            .iter_mut()
            .flat_map(|g| [&mut g.frequency, &mut g.amplitude]);
        let panners = self
            .panners
            .iter_mut()
            .flat_map(|p| [&mut p.azimuth, &mut p.gain]);
        generators.chain(panners)
    }

    fn timeline_at(&self, value: f64) -> RecordedTimeline {
        let mut timeline = RecordedTimeline::new(value);
        timeline.now = self.now;
        timeline
    }
}

impl AudioGraph for RecordingGraph {
    fn add_generator(&mut self, kind: GeneratorKind) -> Result<GeneratorId> {
        let node = GeneratorNode {
            kind,
            frequency: self.timeline_at(DEFAULT_FREQUENCY),
            amplitude: self.timeline_at(1.0),
            harmonics: 0,
            panners: Vec::new(),
            to_output: false,
        };
        self.generators.push(node);
        Ok(GeneratorId(self.generators.len() - 1))
    }

    fn add_panner(&mut self, strategy: PanningStrategy) -> Result<PannerId> {
        let node = PannerNode {
            strategy,
            azimuth: self.timeline_at(0.0),
            gain: self.timeline_at(1.0),
        };
        self.panners.push(node);
        Ok(PannerId(self.panners.len() - 1))
    }

    fn connect(&mut self, generator: GeneratorId, panner: PannerId) -> Result<()> {
        self.panner(panner)?;
        let node = self.generator_mut(generator)?;
        if !node.panners.contains(&panner) {
            node.panners.push(panner);
        }
        Ok(())
    }

    fn connect_to_output(&mut self, generator: GeneratorId) -> Result<()> {
        self.generator_mut(generator)?.to_output = true;
        Ok(())
    }

    fn timeline(&mut self, param: Param) -> Result<&mut dyn Timeline> {
        let timeline = match param {
            Param::Frequency(id) => self.generators.get_mut(id.0).map(|g| &mut g.frequency),
            Param::Amplitude(id) => self.generators.get_mut(id.0).map(|g| &mut g.amplitude),
            Param::Azimuth(id) => self.panners.get_mut(id.0).map(|p| &mut p.azimuth),
            Param::Gain(id) => self.panners.get_mut(id.0).map(|p| &mut p.gain),
        };
        match timeline {
            Some(timeline) => Ok(timeline),
            None => Err(SonifyError::UnknownNode {
                node: param.to_string(),
            }),
        }
    }

    fn set_harmonics(&mut self, generator: GeneratorId, count: u32) -> Result<()> {
        self.generator_mut(generator)?.harmonics = count;
        Ok(())
    }

    fn open_output(&mut self) -> Result<()> {
        match self.device {
            DeviceState::Unavailable => Err(SonifyError::Device {
                reason: "no output device available".to_string(),
            }),
            _ => {
                debug!("recording graph output opened");
                self.device = DeviceState::Open;
                Ok(())
            }
        }
    }

    fn close_output(&mut self) -> Result<()> {
        if self.device == DeviceState::Open {
            debug!("recording graph output closed");
            self.device = DeviceState::Closed;
        }
        Ok(())
    }
}
