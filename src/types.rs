//! Data model exchanged between the pipeline stages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Object classes a detector may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    Car,
    Bus,
    Truck,
    Motorcycle,
    Bicycle,
    Pedestrian,
    #[default]
    Unknown,
}

/// A single detector output, scoped to one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box, serialized as `[x1, y1, x2, y2]`
    pub bbox: Rect,
    /// Detection confidence in `[0, 1]`
    pub score: f32,
    #[serde(rename = "class", alias = "cls", default)]
    pub class: ObjectClass,
    #[serde(default)]
    pub frame_id: u64,
    #[serde(default)]
    pub approach_id: String,
}

impl Detection {
    pub fn new(bbox: Rect, score: f32, class: ObjectClass) -> Self {
        Self {
            bbox,
            score,
            class,
            frame_id: 0,
            approach_id: String::new(),
        }
    }

    /// Stamp the frame and approach this detection belongs to.
    pub fn at(mut self, frame_id: u64, approach_id: impl Into<String>) -> Self {
        self.frame_id = frame_id;
        self.approach_id = approach_id.into();
        self
    }
}

/// A persistent object identity maintained by a tracker.
///
/// `class` is fixed when the track is created; later detections of a different
/// class never extend it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub track_id: u64,
    pub bbox: Rect,
    #[serde(rename = "class")]
    pub class: ObjectClass,
    pub approach_id: String,
    pub last_seen_frame: u64,
    #[serde(default)]
    pub is_counted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Movement {
    Through,
    Left,
    Right,
}

/// Per-lane statistics, recomputed every cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneStat {
    pub approach_id: String,
    pub lane_id: String,
    pub movement: Movement,
    pub queue_len: usize,
    pub arrival_rate_vph: f64,
    pub occupancy: f64,
    pub spillback: bool,
}

/// Green-time allocation produced by one optimization call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Splits {
    pub cycle_s: f64,
    /// lane_id -> green seconds
    pub greens_s: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Ambulance,
    Fire,
    Police,
}

/// An emergency vehicle approaching the intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyEvent {
    pub vehicle_id: String,
    pub vehicle_type: VehicleType,
    pub approach_id: String,
    pub eta_s: f64,
    #[serde(default = "siren_default")]
    pub siren_on: bool,
}

fn siren_default() -> bool {
    true
}
