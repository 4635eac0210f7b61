//! Lane features from a GeoJSON-like document.
//!
//! A feature is a lane iff `properties.type == "lane"`. Lanes need `lane_id`,
//! `approach_id`, `movement` and a polygon whose first ring is a list of
//! `[x, y]` pixel pairs. Everything else is skipped.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, SignalError};
use crate::geometry::Polygon;
use crate::lanes::Lane;
use crate::types::Movement;

#[derive(Debug, Deserialize)]
struct LaneProperties {
    lane_id: String,
    approach_id: String,
    movement: Movement,
}

#[derive(Debug, Deserialize)]
struct LaneGeometry {
    coordinates: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Deserialize)]
struct LaneFeature {
    properties: LaneProperties,
    geometry: LaneGeometry,
}

fn is_lane(feature: &Value) -> bool {
    feature
        .get("properties")
        .and_then(|p| p.get("type"))
        .and_then(Value::as_str)
        == Some("lane")
}

fn parse_feature(feature: &Value) -> std::result::Result<Lane, String> {
    let LaneFeature {
        properties,
        geometry,
    } = LaneFeature::deserialize(feature).map_err(|e| e.to_string())?;

    let ring = geometry
        .coordinates
        .into_iter()
        .next()
        .ok_or_else(|| "polygon has no ring".to_string())?;
    if ring.len() < 3 {
        return Err(format!("ring has {} points", ring.len()));
    }

    Ok(Lane {
        lane_id: properties.lane_id,
        approach_id: properties.approach_id,
        movement: properties.movement,
        polygon: Polygon::new(ring.into_iter().map(|[x, y]| (x, y)).collect()),
    })
}

/// Parse lanes in document order.
pub(crate) fn parse_lanes(document: &str) -> Result<Vec<Lane>> {
    let root: Value = serde_json::from_str(document)?;
    let features = root
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| SignalError::InvalidGeometry("missing `features` list".to_string()))?;

    let mut lanes: Vec<Lane> = Vec::new();
    for (index, feature) in features.iter().enumerate() {
        if !is_lane(feature) {
            debug!(index, "ignoring non-lane feature");
            continue;
        }
        match parse_feature(feature) {
            Ok(lane) => lanes.push(lane),
            Err(reason) => warn!(index, %reason, "skipping malformed lane feature"),
        }
    }
    Ok(lanes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_lanes_in_order() {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [
                {"properties": {"type": "lane", "lane_id": "N1", "approach_id": "N", "movement": "through"},
                 "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
                {"properties": {"type": "stop_line"},
                 "geometry": {"type": "LineString", "coordinates": [[0,0],[10,0]]}},
                {"properties": {"type": "lane", "lane_id": "E1", "approach_id": "E", "movement": "left"},
                 "geometry": {"type": "Polygon", "coordinates": [[[20,0],[30,0],[30,10]]]}}
            ]
        }"#;
        let lanes = parse_lanes(doc).unwrap();
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].lane_id, "N1");
        assert_eq!(lanes[1].movement, Movement::Left);
    }

    #[test]
    fn test_malformed_features_are_skipped() {
        let doc = r#"{"features": [
            {"properties": {"type": "lane", "lane_id": "N1", "approach_id": "N", "movement": "u_turn"},
             "geometry": {"coordinates": [[[0,0],[10,0],[10,10]]]}},
            {"properties": {"type": "lane", "approach_id": "N", "movement": "through"},
             "geometry": {"coordinates": [[[0,0],[10,0],[10,10]]]}},
            {"properties": {"type": "lane", "lane_id": "N2", "approach_id": "N", "movement": "through"},
             "geometry": {"coordinates": [[[0,0],[10,0]]]}},
            {"properties": {"type": "lane", "lane_id": "N3", "approach_id": "N", "movement": "right"},
             "geometry": {"coordinates": [[[0,0],[10,0],[10,10]]]}},
            {"properties": {"type": "lane", "lane_id": "N3", "approach_id": "S", "movement": "right"},
             "geometry": {"coordinates": [[[0,0],[10,0],[10,10]]]}}
        ]}"#;
        let lanes = parse_lanes(doc).unwrap();
        assert_eq!(lanes.len(), 2);
        assert!(lanes.iter().all(|l| l.lane_id == "N3"));
    }

    #[test]
    fn test_missing_features_is_an_error() {
        assert!(matches!(
            parse_lanes(r#"{"type": "FeatureCollection"}"#),
            Err(SignalError::InvalidGeometry(_))
        ));
        assert!(matches!(parse_lanes("not json"), Err(SignalError::Json(_))));
    }
}
