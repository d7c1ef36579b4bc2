//! Audio Graph Abstraction
//!
//! The encoders never render sound themselves. They talk to an
//! [`AudioGraph`]: a set of generators and panners whose scalar controls are
//! [`Timeline`]s that can be set now, ramped, or handed an [`Envelope`] to
//! play in the future. [`RecordingGraph`] is the in-process implementation.

mod envelope;
mod recording;
mod timeline;
mod traits;

pub use envelope::Envelope;
pub use recording::{
    DeviceState, LoggedOp, RecordedTimeline, RecordingGraph, TimelineOp, TimelineReport,
};
pub use timeline::{Automation, ScheduledEvent, Timeline};
pub use traits::{
    AudioGraph, GeneratorId, GeneratorKind, NoiseColor, PannerId, PanningStrategy, Param,
};
