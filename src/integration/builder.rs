//! Builder for creating Detection objects from various input formats.

use crate::geometry::Rect;
use crate::types::{Detection, ObjectClass};

/// Builder for creating `Detection` objects from various input formats.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: Rect,
    score: f32,
    class: ObjectClass,
    frame_id: u64,
    approach_id: String,
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in corner form (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Set bounding box in center form (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.bbox = Rect::from_xywh(cx, cy, w, h);
        self
    }

    pub fn score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    pub fn class(mut self, class: ObjectClass) -> Self {
        self.class = class;
        self
    }

    pub fn frame(mut self, frame_id: u64) -> Self {
        self.frame_id = frame_id;
        self
    }

    pub fn approach(mut self, approach_id: impl Into<String>) -> Self {
        self.approach_id = approach_id.into();
        self
    }

    pub fn build(self) -> Detection {
        Detection::new(self.bbox, self.score, self.class).at(self.frame_id, self.approach_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .xywh(30.0, 50.0, 40.0, 60.0)
            .score(0.95)
            .class(ObjectClass::Truck)
            .frame(7)
            .approach("W")
            .build();

        assert_eq!(det.bbox.to_tlbr(), [10.0, 20.0, 50.0, 80.0]);
        assert_eq!(det.score, 0.95);
        assert_eq!(det.class, ObjectClass::Truck);
        assert_eq!((det.frame_id, det.approach_id.as_str()), (7, "W"));
    }
}
