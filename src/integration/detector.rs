//! Trait for object detection inference backends.

use std::convert::Infallible;

use crate::types::Detection;

/// Object detector over frames of type `F`.
///
/// Implement this trait to connect any detection model to the pipeline. Every
/// returned detection must carry one of the [`ObjectClass`] values.
///
/// [`ObjectClass`]: crate::types::ObjectClass
pub trait Detector<F> {
    /// Error type for detection failures.
    type Error: std::fmt::Display;

    /// Detect objects in one frame seen from `approach_id`.
    fn infer(&mut self, frame: &F, frame_id: u64, approach_id: &str) -> Result<Vec<Detection>, Self::Error>;
}

/// Returns the same detections for every frame, stamped with the frame id and
/// approach. Useful to drive the pipeline without a model.
#[derive(Debug, Clone, Default)]
pub struct StaticDetector {
    detections: Vec<Detection>,
}

impl StaticDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl<F> Detector<F> for StaticDetector {
    type Error = Infallible;

    fn infer(&mut self, _frame: &F, frame_id: u64, approach_id: &str) -> Result<Vec<Detection>, Self::Error> {
        Ok(self
            .detections
            .iter()
            .cloned()
            .map(|d| d.at(frame_id, approach_id))
            .collect())
    }
}
