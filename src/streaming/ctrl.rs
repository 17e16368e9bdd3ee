//! Playback control gate.

use super::error::StreamError;
use super::traits::{BoxedStreamer, Streamer};
use crate::{Frame, SILENCE};

/// Pauses and resumes a streamer.
///
/// While paused, `Ctrl` streams silence and never reports exhaustion. Without
/// a streamer it streams nothing and reports `(0, false)`, which is not an
/// error. Swap [`Ctrl::streamer`] to change what plays.
#[derive(Debug)]
pub struct Ctrl<S = BoxedStreamer> {
    /// The controlled streamer, if any.
    pub streamer: Option<S>,
    /// Whether playback is paused.
    pub paused: bool,
}

impl<S> Default for Ctrl<S> {
    fn default() -> Self {
        Self {
            streamer: None,
            paused: false,
        }
    }
}

impl<S: Streamer> Ctrl<S> {
    /// Creates an unpaused gate around `streamer`.
    pub const fn new(streamer: S) -> Self {
        Self {
            streamer: Some(streamer),
            paused: false,
        }
    }

    /// Pauses playback.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes playback.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flips the paused state.
    pub fn toggle(&mut self) {
        self.paused = !self.paused;
    }
}

impl<S: Streamer> Streamer for Ctrl<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let Some(streamer) = self.streamer.as_mut() else {
            return (0, false);
        };
        if self.paused {
            frames.fill(SILENCE);
            return (frames.len(), true);
        }
        streamer.stream(frames)
    }

    fn err(&self) -> Option<StreamError> {
        self.streamer.as_ref().and_then(Streamer::err)
    }
}
