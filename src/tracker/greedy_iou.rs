//! Greedy per-detection IOU association.

use tracing::debug;

use crate::tracker::{TrackIdAllocator, Tracker};
use crate::types::{Detection, Track};

/// Extends, for each detection, the same-class track it overlaps most.
///
/// Only tracks that existed before the current frame are candidates, so two
/// detections in one frame never merge into a track born in that frame. A track
/// may be extended by more than one detection of the same frame; the last one
/// wins. Ties on the maximum IOU go to the earliest track in creation order.
///
/// Unmatched tracks stay in the pool until `frame_id - last_seen_frame`
/// exceeds `max_age`, but `update` only reports tracks touched this frame.
#[derive(Debug, Clone)]
pub struct GreedyIouTracker {
    iou_thresh: f32,
    max_age: u64,
    tracks: Vec<Track>,
    ids: TrackIdAllocator,
}

impl GreedyIouTracker {
    pub fn new(iou_thresh: f32, max_age: u64) -> Self {
        Self {
            iou_thresh,
            max_age,
            tracks: Vec::new(),
            ids: TrackIdAllocator::default(),
        }
    }

    /// Every retained track, touched this frame or not.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn best_match(&self, candidates: usize, det: &Detection) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, track) in self.tracks[..candidates].iter().enumerate() {
            if track.class != det.class {
                continue;
            }
            let iou = track.bbox.iou(&det.bbox);
            if iou > best.map_or(0.0, |(_, b)| b) {
                best = Some((idx, iou));
            }
        }
        best
    }
}

impl Tracker for GreedyIouTracker {
    fn update(&mut self, detections: &[Detection], frame_id: u64) -> Vec<Track> {
        let candidates = self.tracks.len();
        let mut touched: Vec<usize> = Vec::with_capacity(detections.len());
        let mut spawned = 0usize;

        for det in detections {
            match self.best_match(candidates, det) {
                Some((idx, iou)) if iou >= self.iou_thresh => {
                    let track = &mut self.tracks[idx];
                    track.bbox = det.bbox;
                    track.last_seen_frame = frame_id;
                    if !touched.contains(&idx) {
                        touched.push(idx);
                    }
                }
                _ => {
                    self.tracks.push(Track {
                        track_id: self.ids.next_id(),
                        bbox: det.bbox,
                        class: det.class,
                        approach_id: det.approach_id.clone(),
                        last_seen_frame: frame_id,
                        is_counted: false,
                    });
                    touched.push(self.tracks.len() - 1);
                    spawned += 1;
                }
            }
        }

        let active: Vec<Track> = touched.iter().map(|&idx| self.tracks[idx].clone()).collect();

        let before = self.tracks.len();
        let max_age = self.max_age;
        self.tracks
            .retain(|t| frame_id.saturating_sub(t.last_seen_frame) <= max_age);

        debug!(
            frame_id,
            detections = detections.len(),
            matched = active.len() - spawned,
            spawned,
            pruned = before - self.tracks.len(),
            "greedy iou update"
        );

        active
    }
}
