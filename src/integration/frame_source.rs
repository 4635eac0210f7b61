//! Frame sources feeding the pipeline.

use std::convert::Infallible;
use std::time::SystemTime;

/// One captured frame. `image` is opaque to the pipeline.
#[derive(Debug, Clone)]
pub struct Frame<F> {
    /// Starts at 1 and increases by one per frame.
    pub frame_id: u64,
    pub timestamp: SystemTime,
    pub image: F,
}

pub trait FrameSource<F> {
    type Error: std::fmt::Display;

    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame<F>>, Self::Error>;
}

/// Wraps any iterator of images, numbering frames from 1.
#[derive(Debug, Clone)]
pub struct IterFrames<I> {
    images: I,
    frame_id: u64,
}

impl<I> IterFrames<I> {
    pub fn new(images: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            images: images.into_iter(),
            frame_id: 0,
        }
    }
}

impl<I: Iterator> FrameSource<I::Item> for IterFrames<I> {
    type Error = Infallible;

    fn next_frame(&mut self) -> Result<Option<Frame<I::Item>>, Self::Error> {
        Ok(self.images.next().map(|image| {
            self.frame_id += 1;
            Frame {
                frame_id: self.frame_id,
                timestamp: SystemTime::now(),
                image,
            }
        }))
    }
}
