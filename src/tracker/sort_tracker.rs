//! SORT-style tracker: Kalman prediction plus IoU association.

use tracing::debug;

use crate::geometry::Rect;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, AssignmentResult};
use crate::tracker::sort_track::KalmanTrack;
use crate::tracker::{AssignmentStrategy, TrackIdAllocator, Tracker};
use crate::types::{Detection, ObjectClass, Track};

pub struct SortTracker {
    iou_thresh: f32,
    max_age: u64,
    assignment: AssignmentStrategy,
    tracks: Vec<KalmanTrack>,
    ids: TrackIdAllocator,
    kalman_filter: KalmanFilter,
}

impl SortTracker {
    pub fn new(iou_thresh: f32, max_age: u64) -> Self {
        Self {
            iou_thresh,
            max_age,
            assignment: AssignmentStrategy::Greedy,
            tracks: Vec::new(),
            ids: TrackIdAllocator::default(),
            kalman_filter: KalmanFilter::default(),
        }
    }

    pub fn with_assignment(mut self, assignment: AssignmentStrategy) -> Self {
        self.assignment = assignment;
        self
    }

    pub fn tracks(&self) -> &[KalmanTrack] {
        &self.tracks
    }

    /// Filter state of one track, `[cx, cy, w, h, vcx, vcy, vw, vh]`.
    pub fn kalman_state(&self, track_id: u64) -> Option<[f64; 8]> {
        self.tracks
            .iter()
            .find(|t| t.track_id == track_id)
            .map(KalmanTrack::state)
    }
}

impl Tracker for SortTracker {
    /// Returns every surviving track: matched, newly spawned, and unmatched
    /// ones not yet older than `max_age`.
    fn update(&mut self, detections: &[Detection], frame_id: u64) -> Vec<Track> {
        // Step 1: predict
        for track in self.tracks.iter_mut() {
            track.predict(&self.kalman_filter);
        }

        // Step 2: class-aware association against predicted boxes
        let predicted: Vec<(Rect, ObjectClass)> =
            self.tracks.iter().map(|t| (t.bbox(), t.class)).collect();
        let cost = matching::iou_cost_matrix(&predicted, detections);

        let AssignmentResult {
            matches,
            unmatched_detections,
            ..
        } = match self.assignment {
            AssignmentStrategy::Greedy => matching::greedy_assignment(&cost, self.iou_thresh),
            AssignmentStrategy::Optimal => matching::linear_assignment(&cost, self.iou_thresh),
        };

        // Step 3: correct matched tracks
        for &(itrack, idet) in &matches {
            self.tracks[itrack].correct(&detections[idet], &self.kalman_filter, frame_id);
        }

        // Step 4: spawn tracks for unmatched detections
        for &idet in &unmatched_detections {
            let id = self.ids.next_id();
            self.tracks.push(KalmanTrack::new(
                id,
                &detections[idet],
                frame_id,
                &self.kalman_filter,
            ));
        }

        // Step 5: prune stale tracks
        let before = self.tracks.len();
        let max_age = self.max_age;
        self.tracks
            .retain(|t| frame_id.saturating_sub(t.last_seen_frame) <= max_age);

        debug!(
            frame_id,
            detections = detections.len(),
            matched = matches.len(),
            spawned = unmatched_detections.len(),
            pruned = before - self.tracks.len(),
            "sort update"
        );

        self.tracks.iter().map(KalmanTrack::to_track).collect()
    }
}
