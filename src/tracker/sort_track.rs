//! Single Kalman-filtered track.

use ndarray::{Array1, Array2};
use tracing::warn;

use crate::geometry::Rect;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::types::{Detection, ObjectClass, Track};

#[derive(Debug, Clone)]
pub struct KalmanTrack {
    pub track_id: u64,
    /// Fixed at creation
    pub class: ObjectClass,
    pub approach_id: String,
    pub last_seen_frame: u64,
    /// Kalman filter state mean (8-dim)
    mean: Array1<f64>,
    /// Kalman filter state covariance (8x8)
    covariance: Array2<f64>,
}

fn measurement(bbox: &Rect) -> [f64; 4] {
    let [cx, cy, w, h] = bbox.to_xywh();
    [cx as f64, cy as f64, w as f64, h as f64]
}

impl KalmanTrack {
    pub fn new(track_id: u64, det: &Detection, frame_id: u64, kalman_filter: &KalmanFilter) -> Self {
        let (mean, covariance) = kalman_filter.initiate(measurement(&det.bbox));
        Self {
            track_id,
            class: det.class,
            approach_id: det.approach_id.clone(),
            last_seen_frame: frame_id,
            mean,
            covariance,
        }
    }

    /// Current filtered box.
    pub fn bbox(&self) -> Rect {
        Rect::from_xywh(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    /// Full state `[cx, cy, w, h, vcx, vcy, vw, vh]`.
    pub fn state(&self) -> [f64; 8] {
        let mut state = [0.0; 8];
        for (slot, value) in state.iter_mut().zip(self.mean.iter()) {
            *slot = *value;
        }
        state
    }

    pub fn predict(&mut self, kalman_filter: &KalmanFilter) {
        let (mean, covariance) = kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
    }

    /// Correct with a matched detection. A failed correction keeps the
    /// predicted state but still counts as seen.
    pub fn correct(&mut self, det: &Detection, kalman_filter: &KalmanFilter, frame_id: u64) {
        match kalman_filter.update(&self.mean, &self.covariance, measurement(&det.bbox)) {
            Ok((mean, covariance)) => {
                self.mean = mean;
                self.covariance = covariance;
            }
            Err(err) => warn!(track_id = self.track_id, %err, "kalman correction skipped"),
        }
        self.last_seen_frame = frame_id;
    }

    pub fn to_track(&self) -> Track {
        Track {
            track_id: self.track_id,
            bbox: self.bbox(),
            class: self.class,
            approach_id: self.approach_id.clone(),
            last_seen_frame: self.last_seen_frame,
            is_counted: false,
        }
    }
}
