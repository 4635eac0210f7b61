//! Replay of recorded detector output.
//!
//! A recording is JSON lines, one frame per line:
//!
//! ```text
//! {"detections": [{"bbox": [10, 20, 50, 80], "score": 0.9, "class": "car"}]}
//! ```
//!
//! Blank lines are skipped. Frame ids are assigned on replay, starting at 1.

use std::convert::Infallible;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::SystemTime;

use serde::Deserialize;

use crate::error::SignalError;
use crate::integration::{Detector, Frame, FrameSource};
use crate::types::Detection;

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Frame source whose "image" is the recorded detection list.
#[derive(Debug)]
pub struct RecordedFrames<R> {
    reader: R,
    frame_id: u64,
    line_no: usize,
}

impl RecordedFrames<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SignalError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SignalError::io(path, e))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordedFrames<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            frame_id: 0,
            line_no: 0,
        }
    }
}

impl<R: BufRead> FrameSource<Vec<Detection>> for RecordedFrames<R> {
    type Error = SignalError;

    fn next_frame(&mut self) -> Result<Option<Frame<Vec<Detection>>>, Self::Error> {
        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .reader
                .read_line(&mut line)
                .map_err(|e| SignalError::FrameSource(e.to_string()))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        let record: RecordedFrame = serde_json::from_str(&line)
            .map_err(|e| SignalError::FrameSource(format!("line {}: {e}", self.line_no)))?;
        self.frame_id += 1;
        Ok(Some(Frame {
            frame_id: self.frame_id,
            timestamp: SystemTime::now(),
            image: record.detections,
        }))
    }
}

/// Detector that hands back the detections carried by a [`RecordedFrames`]
/// frame. Recorded detections without an approach get the camera's.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedDetector;

impl Detector<Vec<Detection>> for RecordedDetector {
    type Error = Infallible;

    fn infer(
        &mut self,
        frame: &Vec<Detection>,
        frame_id: u64,
        approach_id: &str,
    ) -> Result<Vec<Detection>, Self::Error> {
        Ok(frame
            .iter()
            .map(|d| {
                let approach = if d.approach_id.is_empty() {
                    approach_id.to_string()
                } else {
                    d.approach_id.clone()
                };
                d.clone().at(frame_id, approach)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectClass;

    const RECORDING: &str = r#"{"detections": [{"bbox": [10, 20, 50, 80], "score": 0.9, "class": "car"}]}

{"detections": []}
{"detections": [{"bbox": [0, 0, 5, 5], "score": 0.5, "cls": "bus", "approach_id": "S"}]}
"#;

    #[test]
    fn test_replays_frames_in_order() {
        let mut frames = RecordedFrames::new(RECORDING.as_bytes());
        let mut detector = RecordedDetector;

        let first = frames.next_frame().unwrap().unwrap();
        assert_eq!(first.frame_id, 1);
        let dets = detector.infer(&first.image, first.frame_id, "N").unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].class, ObjectClass::Car);
        assert_eq!((dets[0].frame_id, dets[0].approach_id.as_str()), (1, "N"));

        let second = frames.next_frame().unwrap().unwrap();
        assert_eq!(second.frame_id, 2);
        assert!(second.image.is_empty());

        let third = frames.next_frame().unwrap().unwrap();
        let dets = detector.infer(&third.image, third.frame_id, "N").unwrap();
        assert_eq!(dets[0].approach_id, "S");

        assert!(frames.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_bad_line_is_an_error() {
        let mut frames = RecordedFrames::new("{\"detections\": 3}\n".as_bytes());
        let err = frames.next_frame().unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }
}
