use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, SignalError};
use crate::geometry::box_centroid;
use crate::lanes::{Lane, geojson};
use crate::types::{LaneStat, Track};

/// Approach reported for points outside every lane.
pub const UNKNOWN_APPROACH: &str = "unknown";

/// Queue length above which a lane is flagged as spilling back.
const SPILLBACK_QUEUE: usize = 8;
/// Queue length at which occupancy saturates at 1.0.
const OCCUPANCY_FULL_QUEUE: f64 = 10.0;
/// Queue counts are treated as per-minute and scaled to per-hour.
const MINUTES_PER_HOUR: f64 = 60.0;

/// Tracks inside one lane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneBucket {
    pub lane_id: String,
    pub tracks: Vec<Track>,
}

/// Per-lane track buckets, one per lane in load order (empty lanes included).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LaneAssignments {
    buckets: Vec<LaneBucket>,
}

impl LaneAssignments {
    pub fn get(&self, lane_id: &str) -> Option<&[Track]> {
        self.buckets
            .iter()
            .find(|b| b.lane_id == lane_id)
            .map(|b| b.tracks.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LaneBucket> {
        self.buckets.iter()
    }

    /// Number of tracks assigned to any lane.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.tracks.len()).sum()
    }
}

/// Immutable lane set with a fixed enumeration order.
///
/// Overlapping polygons are resolved by that order: a point belongs to the
/// first lane that contains it.
#[derive(Debug, Clone)]
pub struct LaneMapper {
    lanes: Vec<Lane>,
}

impl LaneMapper {
    /// Duplicate `lane_id`s keep the first lane.
    pub fn new(lanes: Vec<Lane>) -> Self {
        let mut unique: Vec<Lane> = Vec::with_capacity(lanes.len());
        for lane in lanes {
            if unique.iter().any(|l| l.lane_id == lane.lane_id) {
                warn!(lane_id = %lane.lane_id, "duplicate lane_id, keeping the first");
                continue;
            }
            unique.push(lane);
        }
        Self { lanes: unique }
    }

    pub fn from_geojson_str(document: &str) -> Result<Self> {
        let lanes = geojson::parse_lanes(document)?;
        info!(lanes = lanes.len(), "lane geometry loaded");
        Ok(Self::new(lanes))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path).map_err(|e| SignalError::io(path, e))?;
        Self::from_geojson_str(&document)
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    fn lane_at(&self, x: f64, y: f64) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.polygon.contains(x, y))
    }

    /// Bucket tracks by the lane containing their box centroid. Tracks outside
    /// every lane are left out.
    pub fn assign_tracks(&self, tracks: &[Track]) -> LaneAssignments {
        let mut buckets: Vec<LaneBucket> = self
            .lanes
            .iter()
            .map(|lane| LaneBucket {
                lane_id: lane.lane_id.clone(),
                tracks: Vec::new(),
            })
            .collect();

        for track in tracks {
            let (cx, cy) = box_centroid(&track.bbox);
            if let Some(idx) = self.lane_at(cx as f64, cy as f64) {
                buckets[idx].tracks.push(track.clone());
            }
        }

        LaneAssignments { buckets }
    }

    pub fn compute_lane_stats(&self, assignments: &LaneAssignments) -> Vec<LaneStat> {
        assignments
            .iter()
            .filter_map(|bucket| {
                let lane = self.lanes.iter().find(|l| l.lane_id == bucket.lane_id)?;
                let queue_len = bucket.tracks.len();
                Some(LaneStat {
                    approach_id: lane.approach_id.clone(),
                    lane_id: lane.lane_id.clone(),
                    movement: lane.movement,
                    queue_len,
                    arrival_rate_vph: queue_len as f64 * MINUTES_PER_HOUR,
                    occupancy: (queue_len as f64 / OCCUPANCY_FULL_QUEUE).min(1.0),
                    spillback: queue_len > SPILLBACK_QUEUE,
                })
            })
            .collect()
    }

    /// Approach of the first lane containing the point, or [`UNKNOWN_APPROACH`].
    pub fn get_approach_for_point(&self, x: f64, y: f64) -> &str {
        self.lane_at(x, y)
            .map_or(UNKNOWN_APPROACH, |idx| self.lanes[idx].approach_id.as_str())
    }

    /// Vehicles per approach, summed over its lanes. Every approach with at
    /// least one lane is present.
    pub fn approach_counts(&self, assignments: &LaneAssignments) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for lane in &self.lanes {
            let queued = assignments.get(&lane.lane_id).map_or(0, <[Track]>::len);
            *counts.entry(lane.approach_id.clone()).or_default() += queued;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Polygon, Rect};
    use crate::types::{Movement, ObjectClass};

    fn lane(lane_id: &str, approach_id: &str, x0: f64, x1: f64) -> Lane {
        Lane {
            lane_id: lane_id.to_string(),
            approach_id: approach_id.to_string(),
            movement: Movement::Through,
            polygon: Polygon::new(vec![(x0, 0.0), (x1, 0.0), (x1, 100.0), (x0, 100.0)]),
        }
    }

    fn track_at(track_id: u64, cx: f32, cy: f32) -> Track {
        Track {
            track_id,
            bbox: Rect::from_xywh(cx, cy, 10.0, 10.0),
            class: ObjectClass::Car,
            approach_id: "N".to_string(),
            last_seen_frame: 1,
            is_counted: false,
        }
    }

    fn mapper() -> LaneMapper {
        LaneMapper::new(vec![lane("N1", "N", 0.0, 100.0), lane("E1", "E", 100.0, 200.0)])
    }

    #[test]
    fn test_assigns_to_containing_lane_only() {
        let assignments = mapper().assign_tracks(&[track_at(1, 50.0, 50.0)]);
        assert_eq!(assignments.get("N1").unwrap().len(), 1);
        assert!(assignments.get("E1").unwrap().is_empty());
    }

    #[test]
    fn test_point_outside_all_lanes_is_dropped() {
        let mapper = mapper();
        let assignments = mapper.assign_tracks(&[track_at(1, 500.0, 50.0)]);
        assert_eq!(assignments.total(), 0);
        assert_eq!(mapper.get_approach_for_point(500.0, 50.0), UNKNOWN_APPROACH);
        assert_eq!(mapper.get_approach_for_point(150.0, 50.0), "E");
    }

    #[test]
    fn test_overlap_resolved_by_load_order() {
        let mapper = LaneMapper::new(vec![lane("B", "S", 0.0, 100.0), lane("A", "W", 50.0, 150.0)]);
        let assignments = mapper.assign_tracks(&[track_at(1, 75.0, 50.0)]);
        assert_eq!(assignments.get("B").unwrap().len(), 1);
        assert!(assignments.get("A").unwrap().is_empty());
        assert_eq!(mapper.get_approach_for_point(75.0, 50.0), "S");
    }

    #[test]
    fn test_lane_stats() {
        let mapper = mapper();
        let tracks: Vec<Track> = (0..9).map(|i| track_at(i, 50.0, 5.0 + i as f32 * 10.0)).collect();
        let stats = mapper.compute_lane_stats(&mapper.assign_tracks(&tracks));

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].lane_id, "N1");
        assert_eq!(stats[0].queue_len, 9);
        assert_eq!(stats[0].arrival_rate_vph, 540.0);
        assert!((stats[0].occupancy - 0.9).abs() < 1e-9);
        assert!(stats[0].spillback);

        assert_eq!(stats[1].queue_len, 0);
        assert_eq!(stats[1].occupancy, 0.0);
        assert!(!stats[1].spillback);
    }

    #[test]
    fn test_occupancy_saturates() {
        let mapper = mapper();
        let tracks: Vec<Track> = (0..12).map(|i| track_at(i, 50.0, 50.0)).collect();
        let stats = mapper.compute_lane_stats(&mapper.assign_tracks(&tracks));
        assert_eq!(stats[0].occupancy, 1.0);
    }

    #[test]
    fn test_duplicate_lane_id_keeps_first() {
        let mapper = LaneMapper::new(vec![
            lane("N1", "N", 0.0, 100.0),
            lane("N1", "S", 100.0, 200.0),
            lane("E1", "E", 200.0, 300.0),
        ]);
        assert_eq!(mapper.lanes().len(), 2);
        assert_eq!(mapper.lanes()[0].approach_id, "N");

        let assignments = mapper.assign_tracks(&[track_at(1, 150.0, 50.0)]);
        assert_eq!(assignments.total(), 0);
        let stats = mapper.compute_lane_stats(&assignments);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].approach_id, "N");
    }

    #[test]
    fn test_duplicate_lane_in_document_keeps_first() {
        let doc = r#"{"features": [
            {"properties": {"type": "lane", "lane_id": "N1", "approach_id": "N", "movement": "through"},
             "geometry": {"coordinates": [[[0,0],[100,0],[100,100],[0,100]]]}},
            {"properties": {"type": "lane", "lane_id": "N1", "approach_id": "S", "movement": "left"},
             "geometry": {"coordinates": [[[100,0],[200,0],[200,100],[100,100]]]}}
        ]}"#;
        let mapper = LaneMapper::from_geojson_str(doc).unwrap();
        assert_eq!(mapper.lanes().len(), 1);
        assert_eq!(mapper.lanes()[0].movement, Movement::Through);
    }

    #[test]
    fn test_approach_counts() {
        let mapper = mapper();
        let assignments =
            mapper.assign_tracks(&[track_at(1, 50.0, 50.0), track_at(2, 60.0, 20.0)]);
        let counts = mapper.approach_counts(&assignments);
        assert_eq!(counts["N"], 2);
        assert_eq!(counts["E"], 0);
    }
}
