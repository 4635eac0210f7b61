//! Connecting external detectors and frame sources to the signal pipeline.
//!
//! A [`Detector`] and a [`FrameSource`] are the two collaborators the
//! pipeline consumes; [`Orchestrator`] runs one full cycle per frame and
//! [`PipelineWorker`] moves that loop onto its own thread.

mod builder;
mod detector;
mod frame_source;
mod orchestrator;
mod recorded;
mod worker;

pub use builder::DetectionBuilder;
pub use detector::{Detector, StaticDetector};
pub use frame_source::{Frame, FrameSource, IterFrames};
pub use orchestrator::{CycleOutput, Orchestrator, Presenter};
pub use recorded::{RecordedDetector, RecordedFrames};
pub use worker::PipelineWorker;
