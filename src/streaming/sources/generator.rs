//! Generated sources for streaming audio.

use crate::streaming::{error::StreamError, traits::Streamer};
use crate::{Frame, SILENCE};

/// A streamer of silent frames, finite or endless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Silence {
    remaining: Option<usize>,
}

impl Silence {
    /// Streams `num_frames` frames of silence.
    pub const fn new(num_frames: usize) -> Self {
        Self {
            remaining: Some(num_frames),
        }
    }

    /// Streams silence forever.
    pub const fn infinite() -> Self {
        Self { remaining: None }
    }
}

impl Streamer for Silence {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let n = match self.remaining.as_mut() {
            None => frames.len(),
            Some(0) => return (0, false),
            Some(remaining) => {
                let n = frames.len().min(*remaining);
                *remaining -= n;
                n
            }
        };
        frames[..n].fill(SILENCE);
        (n, true)
    }

    fn err(&self) -> Option<StreamError> {
        None
    }
}
