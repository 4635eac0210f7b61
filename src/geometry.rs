//! Rectangle-overlap and point/polygon primitives.

mod polygon;
mod rect;

pub use polygon::Polygon;
pub use rect::{Rect, box_centroid, iou_batch};
