//! Dynamic mixing of multiple streamers.

use tracing::{trace, warn};

use super::error::StreamError;
use super::traits::{BoxedStreamer, Streamer};
use crate::{Frame, SILENCE};

/// Frames mixed per pass; bounds the scratch allocation and the latency of a
/// single child pull.
const MIX_CHUNK: usize = 512;

/// Mixes any number of streamers by summing them channel-wise.
///
/// Streamers are removed as soon as they drain (return fewer frames than
/// requested or `more == false`). No gain compensation is applied; keeping
/// the sum in range is the caller's concern.
///
/// With keep-alive enabled (the default for [`Mixer::new`]) an empty mixer
/// streams silence forever. Without it, the mixer is exhausted once its set
/// of streamers becomes empty.
///
/// [`Streamer::err`] always returns `None`: a failing child is drained and
/// dropped like any other, and its error should be handled where it occurs.
#[derive(Debug)]
pub struct Mixer<S = BoxedStreamer> {
    streamers: Vec<S>,
    keep_alive: bool,
    scratch: Vec<Frame>,
}

impl<S: Streamer> Default for Mixer<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Streamer> Mixer<S> {
    /// Creates an empty mixer that keeps streaming silence when empty.
    pub fn new() -> Self {
        Self {
            streamers: Vec::new(),
            keep_alive: true,
            scratch: vec![SILENCE; MIX_CHUNK],
        }
    }

    /// Mixes `streamers` together and stops once all of them drained.
    pub fn mix(streamers: impl IntoIterator<Item = S>) -> Self {
        let mut mixer = Self::new();
        mixer.keep_alive = false;
        mixer.streamers.extend(streamers);
        mixer
    }

    /// Configures whether an empty mixer streams silence (`true`) or drains
    /// (`false`).
    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        self.keep_alive = keep_alive;
    }

    /// Returns the keep-alive setting.
    pub const fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Adds a streamer to the mix.
    pub fn add(&mut self, streamer: S) {
        self.streamers.push(streamer);
    }

    /// Removes all streamers.
    pub fn clear(&mut self) {
        self.streamers.clear();
    }

    /// Number of streamers currently playing.
    pub fn len(&self) -> usize {
        self.streamers.len()
    }

    /// Check if no streamers are playing.
    pub fn is_empty(&self) -> bool {
        self.streamers.is_empty()
    }
}

impl<S: Streamer> Extend<S> for Mixer<S> {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        self.streamers.extend(iter);
    }
}

impl<S: Streamer> Streamer for Mixer<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if !self.keep_alive && self.streamers.is_empty() {
            return (0, false);
        }

        let mut n = 0;
        while n < frames.len() {
            let chunk = (frames.len() - n).min(self.scratch.len());
            let out = &mut frames[n..n + chunk];
            out.fill(SILENCE);

            let mut max_streamed = 0;
            let mut i = 0;
            while i < self.streamers.len() {
                let scratch = &mut self.scratch[..chunk];
                let (sn, more) = self.streamers[i].stream(scratch);
                for (o, s) in out.iter_mut().zip(&scratch[..sn]) {
                    o[0] += s[0];
                    o[1] += s[1];
                }
                max_streamed = max_streamed.max(sn);

                if sn < chunk || !more {
                    let drained = self.streamers.swap_remove(i);
                    if let Some(err) = drained.err() {
                        warn!(
                            %err,
                            recoverable = err.is_recoverable(),
                            "dropping failed streamer from mixer"
                        );
                    }
                    trace!(remaining = self.streamers.len(), "removed drained streamer");
                    if !self.keep_alive && self.streamers.is_empty() {
                        let total = n + max_streamed;
                        return (total, total > 0);
                    }
                    continue;
                }
                i += 1;
            }

            n += chunk;
        }
        (n, true)
    }

    fn err(&self) -> Option<StreamError> {
        None
    }
}
