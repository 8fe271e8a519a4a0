//! The sampling engine: extract → detect → estimate → render, driven by a
//! scheduler and by settings changes.

pub mod detector;
pub mod estimator;
pub mod pipeline;
pub mod sampler;
pub mod scheduler;

use crate::config::ChangeSet;

/// Everything that can wake the controller. All events are handled one at
/// a time on the thread that owns the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Tick,
    ConfigChanged(ChangeSet),
    /// Markup read by a background sampler.
    Sampled(sampler::Sample),
}

pub use pipeline::{GaugeController, LoopState, PassOutcome, SAMPLE_PERIOD};
pub use sampler::{InlineSampler, Sample, Sampler, ThreadSampler};
pub use scheduler::{ManualScheduler, Scheduler, ThreadScheduler, Waker};
