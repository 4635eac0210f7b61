//! Lane polygons, track-to-lane assignment and per-lane statistics.

mod geojson;
mod mapper;

use serde::{Deserialize, Serialize};

use crate::geometry::Polygon;
use crate::types::Movement;

pub use mapper::{LaneAssignments, LaneBucket, LaneMapper, UNKNOWN_APPROACH};

/// A lane region and its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub lane_id: String,
    pub approach_id: String,
    pub movement: Movement,
    pub polygon: Polygon,
}
