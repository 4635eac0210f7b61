//! Persistent object identities across frames.
//!
//! Two interchangeable strategies sit behind the [`Tracker`] trait:
//! [`GreedyIouTracker`] extends the best-overlapping track per detection, and
//! [`SortTracker`] runs a constant-velocity Kalman filter per track. Both are
//! class-aware: a detection only ever extends a track of the same class.
//!
//! `update` must be called with strictly increasing frame ids; aging is
//! undefined otherwise.

mod greedy_iou;
mod kalman_filter;
mod matching;
mod sort_track;
mod sort_tracker;

use serde::{Deserialize, Serialize};

use crate::types::{Detection, Track};

pub use greedy_iou::GreedyIouTracker;
pub use kalman_filter::KalmanFilter;
pub use matching::{AssignmentResult, greedy_assignment, iou_cost_matrix, linear_assignment};
pub use sort_track::KalmanTrack;
pub use sort_tracker::SortTracker;

pub trait Tracker: Send {
    /// Associate one frame of detections and return the active tracks.
    fn update(&mut self, detections: &[Detection], frame_id: u64) -> Vec<Track>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerKind {
    #[default]
    GreedyIou,
    KalmanSort,
}

/// How the SORT tracker pairs predicted tracks with detections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStrategy {
    /// Repeatedly take the globally cheapest unassigned pair.
    #[default]
    Greedy,
    /// Minimum-cost bipartite matching (Jonker-Volgenant).
    Optimal,
}

/// Configuration shared by both tracker variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub kind: TrackerKind,
    pub iou_thresh: f32,
    pub max_age: u64,
    pub assignment: AssignmentStrategy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            kind: TrackerKind::GreedyIou,
            iou_thresh: 0.3,
            max_age: 10,
            assignment: AssignmentStrategy::Greedy,
        }
    }
}

/// Select the tracker variant named by `config`.
pub fn build_tracker(config: &TrackerConfig) -> Box<dyn Tracker> {
    match config.kind {
        TrackerKind::GreedyIou => Box::new(GreedyIouTracker::new(config.iou_thresh, config.max_age)),
        TrackerKind::KalmanSort => Box::new(
            SortTracker::new(config.iou_thresh, config.max_age).with_assignment(config.assignment),
        ),
    }
}

/// Hands out track ids starting at 1. Ids are never reused by one allocator.
#[derive(Debug, Clone)]
pub struct TrackIdAllocator {
    next: u64,
}

impl Default for TrackIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl TrackIdAllocator {
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut ids = TrackIdAllocator::default();
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.next_id(), 3);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: TrackerConfig =
            serde_json::from_str(r#"{"kind":"kalman_sort","max_age":15}"#).unwrap();
        assert_eq!(config.kind, TrackerKind::KalmanSort);
        assert_eq!(config.max_age, 15);
        assert!((config.iou_thresh - 0.3).abs() < 1e-6);
    }
}
