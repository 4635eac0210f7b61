//! Adaptive traffic-signal timing for a multi-approach intersection.
//!
//! Per frame, detections from an external model are associated into persistent
//! tracks, the tracks are bucketed into lane polygons, lane statistics are turned
//! into green-time splits (with emergency preemption), and the splits are played
//! out by a phase controller.

pub mod config;
pub mod control;
pub mod emergency;
pub mod error;
pub mod geometry;
pub mod integration;
pub mod lanes;
pub mod optimizer;
pub mod tracker;
pub mod types;

pub use config::PipelineConfig;
pub use error::{Result, SignalError};
pub use geometry::{Polygon, Rect};
pub use lanes::{LaneAssignments, LaneMapper};
pub use optimizer::SignalOptimizer;
pub use tracker::{Tracker, TrackerConfig, TrackerKind, build_tracker};
pub use types::{Detection, EmergencyEvent, LaneStat, Movement, ObjectClass, Splits, Track};
