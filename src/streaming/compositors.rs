//! Compositors: streamers built out of other streamers.
//!
//! - [`Take`] limits a streamer to a number of frames.
//! - [`Loop`] replays a seekable streamer a number of times.
//! - [`SectionLoop`] replays a section of a seekable streamer, see [`LoopOptions`].
//! - [`Seq`] and [`Iterate`] play streamers one after another.
//! - [`Callback`] runs a closure when it is reached.
//! - [`dup`] splits one streamer into two independent readers.
//!
//! Mixing lives in [`Mixer`](crate::Mixer).

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::error::StreamError;
use super::traits::{BoxedStreamer, StreamSeeker, Streamer};
use crate::{ConfigError, ConfigResult, Frame};

/// Streams at most a fixed number of frames from its source.
///
/// Propagates the source's errors.
#[derive(Debug)]
pub struct Take<S> {
    source: S,
    remaining: usize,
}

impl<S: Streamer> Take<S> {
    /// Wraps `source`, limiting it to `num` frames.
    pub const fn new(num: usize, source: S) -> Self {
        Self {
            source,
            remaining: num,
        }
    }

    /// Frames left before this streamer stops.
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Consumes the wrapper and returns the source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: Streamer> Streamer for Take<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if self.remaining == 0 {
            return (0, false);
        }
        let want = frames.len().min(self.remaining);
        let (n, more) = self.source.stream(&mut frames[..want]);
        self.remaining -= n;
        (n, more)
    }

    fn err(&self) -> Option<StreamError> {
        self.source.err()
    }
}

/// Plays a seekable source a number of times.
///
/// A positive `count` plays the source `count` times in total and a negative
/// `count` loops forever. A `count` of zero streams nothing at all; note that
/// this differs from [`LoopOptions::times`], where zero means "play once".
///
/// Propagates the source's errors. A failed seek ends the loop; the error is
/// then reported by [`Streamer::err`].
#[derive(Debug)]
pub struct Loop<S> {
    source: S,
    remaining: i64,
    // Frames produced since the last rewind, across calls.
    since_rewind: usize,
    seek_error: Option<StreamError>,
}

impl<S: StreamSeeker> Loop<S> {
    /// Loops `source` `count` times, or forever if `count` is negative.
    pub const fn new(count: i64, source: S) -> Self {
        Self {
            source,
            remaining: count,
            since_rewind: 0,
            seek_error: None,
        }
    }
}

impl<S: StreamSeeker> Streamer for Loop<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if self.remaining == 0 || self.err().is_some() {
            return (0, false);
        }

        let mut n = 0;
        while n < frames.len() {
            let (sn, more) = self.source.stream(&mut frames[n..]);
            n += sn;
            self.since_rewind += sn;
            if more {
                continue;
            }

            if self.remaining > 0 {
                self.remaining -= 1;
            }
            // A pass that yields nothing would spin forever.
            if self.source.err().is_some() || self.since_rewind == 0 {
                self.remaining = 0;
            }
            if self.remaining == 0 {
                break;
            }
            if let Err(err) = self.source.seek(0) {
                warn!(%err, "seek failed while looping, stopping loop");
                self.seek_error = Some(err);
                break;
            }
            self.since_rewind = 0;
        }
        (n, n > 0)
    }

    fn err(&self) -> Option<StreamError> {
        self.seek_error.clone().or_else(|| self.source.err())
    }
}

/// Options for [`SectionLoop`].
///
/// By default the whole source loops forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopOptions {
    /// Number of repeats after the first play of the section. Negative loops
    /// forever, zero plays the section once.
    pub times: i64,
    /// First frame of the looped section.
    pub start: usize,
    /// One past the last frame of the looped section; `None` is the end of
    /// the source. Clamped to the source length.
    pub end: Option<usize>,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            times: -1,
            start: 0,
            end: None,
        }
    }
}

impl LoopOptions {
    /// Sets the number of repeats.
    pub const fn times(mut self, times: i64) -> Self {
        self.times = times;
        self
    }

    /// Sets the section start.
    pub const fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Sets the section end.
    pub const fn end(mut self, end: usize) -> Self {
        self.end = Some(end);
        self
    }

    /// Sets both section bounds.
    pub const fn between(self, start: usize, end: usize) -> Self {
        self.start(start).end(end)
    }
}

/// Loops a section `[start, end)` of a seekable source.
///
/// Frames before `start` play once. The section then plays `times + 1` times
/// (forever if `times` is negative) and afterwards the rest of the source
/// plays to its natural end. For a source `[0, 1, 2, 3, 4]` with `times = 2`
/// and section `[2, 4)` the output is `[0, 1, 2, 3, 2, 3, 2, 3, 4]`.
///
/// Source and seek errors are captured and end the stream; frames produced
/// in the call that hit the error are still returned.
#[derive(Debug)]
pub struct SectionLoop<S> {
    source: S,
    remaining: i64,
    start: usize,
    end: usize,
    error: Option<StreamError>,
}

impl<S: StreamSeeker> SectionLoop<S> {
    /// Validates `options` against `source` and builds the loop.
    ///
    /// # Errors
    /// [`ConfigError::InvalidLoopStart`] if `start >= source.len()` and
    /// [`ConfigError::InvalidLoopRange`] if `start >= end`.
    pub fn new(source: S, options: LoopOptions) -> ConfigResult<Self> {
        let len = source.len();
        let end = options.end.unwrap_or(usize::MAX);
        if options.start >= len {
            return Err(ConfigError::InvalidLoopStart {
                start: options.start,
                len,
            });
        }
        if options.start >= end {
            return Err(ConfigError::InvalidLoopRange {
                start: options.start,
                end,
            });
        }
        Ok(Self {
            source,
            remaining: options.times,
            start: options.start,
            end: end.min(len),
            error: None,
        })
    }

    fn capture_error(&mut self, err: StreamError) {
        debug!(%err, "section loop stopped by error");
        self.error = Some(err);
    }
}

impl<S: StreamSeeker> Streamer for SectionLoop<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if self.error.is_some() {
            return (0, false);
        }

        let mut n = 0;
        while n < frames.len() {
            let mut want = frames.len() - n;
            if self.remaining != 0 {
                let until_end = self.end.saturating_sub(self.source.position());
                if until_end == 0 {
                    if let Err(err) = self.source.seek(self.start) {
                        warn!(%err, start = self.start, "seek failed at loop section end");
                        self.capture_error(err);
                        return (n, n > 0);
                    }
                    if self.remaining > 0 {
                        self.remaining -= 1;
                    }
                    continue;
                }
                want = want.min(until_end);
            }

            let (sn, more) = self.source.stream(&mut frames[n..n + want]);
            n += sn;
            if sn < want || !more {
                if let Some(err) = self.source.err() {
                    self.capture_error(err);
                }
                return (n, n > 0);
            }
        }
        (n, true)
    }

    fn err(&self) -> Option<StreamError> {
        self.error.clone()
    }
}

/// Plays streamers one after another without gaps.
///
/// Does not propagate errors from its children; [`Streamer::err`] always
/// reports `None`.
#[derive(Debug)]
pub struct Seq<S = BoxedStreamer> {
    streamers: Vec<S>,
    current: usize,
}

impl<S: Streamer> Seq<S> {
    /// Sequences `streamers` in order.
    pub fn new(streamers: impl IntoIterator<Item = S>) -> Self {
        Self {
            streamers: streamers.into_iter().collect(),
            current: 0,
        }
    }
}

impl<S: Streamer> Streamer for Seq<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if frames.is_empty() {
            return (0, self.current < self.streamers.len());
        }
        let mut n = 0;
        let mut more = false;
        while self.current < self.streamers.len() && n < frames.len() {
            let (sn, smore) = self.streamers[self.current].stream(&mut frames[n..]);
            n += sn;
            more |= smore;
            if !smore {
                self.current += 1;
            }
        }
        (n, more || n > 0)
    }

    fn err(&self) -> Option<StreamError> {
        None
    }
}

/// Plays streamers produced lazily by an iterator, one after another.
///
/// The next streamer is pulled from the iterator when the current one is
/// exhausted; the sequence ends when the iterator does. Like [`Seq`], errors
/// of the children are not propagated.
pub struct Iterate<I: Iterator> {
    streamers: I,
    current: Option<I::Item>,
}

impl<I> Iterate<I>
where
    I: Iterator,
    I::Item: Streamer,
{
    /// Plays every streamer yielded by `streamers`.
    pub fn new(streamers: impl IntoIterator<IntoIter = I>) -> Self {
        let mut streamers = streamers.into_iter();
        let current = streamers.next();
        Self { streamers, current }
    }
}

impl<I: Iterator> std::fmt::Debug for Iterate<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Iterate")
            .field("playing", &self.current.is_some())
            .finish_non_exhaustive()
    }
}

impl<I> Streamer for Iterate<I>
where
    I: Iterator,
    I::Item: Streamer,
{
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let mut n = 0;
        while n < frames.len() {
            let Some(current) = self.current.as_mut() else {
                break;
            };
            let (sn, more) = current.stream(&mut frames[n..]);
            n += sn;
            if !more {
                self.current = self.streamers.next();
            }
        }
        (n, n > 0 || (self.current.is_some() && !frames.is_empty()))
    }

    fn err(&self) -> Option<StreamError> {
        None
    }
}

/// Runs a closure the first time it is pulled and streams nothing.
///
/// Placed inside a [`Seq`] it signals that playback reached that point.
pub struct Callback<F> {
    callback: Option<F>,
}

impl<F: FnOnce()> Callback<F> {
    /// Wraps `callback`.
    pub const fn new(callback: F) -> Self {
        Self {
            callback: Some(callback),
        }
    }
}

impl<F> std::fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Callback")
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

impl<F: FnOnce()> Streamer for Callback<F> {
    fn stream(&mut self, _frames: &mut [Frame]) -> (usize, bool) {
        if let Some(callback) = self.callback.take() {
            callback();
        }
        (0, false)
    }

    fn err(&self) -> Option<StreamError> {
        None
    }
}

#[derive(Debug)]
struct DupState<S> {
    source: S,
    pending: [VecDeque<Frame>; 2],
}

/// One of the two readers returned by [`dup`].
///
/// Frames one reader pulls from the shared source ahead of the other are
/// queued for the other reader. Both readers lock the shared state for the
/// duration of a pull; drive them from one thread at a time.
#[derive(Debug)]
pub struct Dup<S> {
    state: Arc<Mutex<DupState<S>>>,
    side: usize,
}

/// Splits `source` into two streamers that each stream all of its data.
pub fn dup<S: Streamer>(source: S) -> (Dup<S>, Dup<S>) {
    let state = Arc::new(Mutex::new(DupState {
        source,
        pending: [VecDeque::new(), VecDeque::new()],
    }));
    (
        Dup {
            state: Arc::clone(&state),
            side: 0,
        },
        Dup { state, side: 1 },
    )
}

impl<S: Streamer> Streamer for Dup<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let mut state = self.state.lock();
        let state = &mut *state;

        let own = &mut state.pending[self.side];
        let mut more = !own.is_empty();
        let mut n = 0;
        while n < frames.len() {
            let Some(frame) = own.pop_front() else {
                break;
            };
            frames[n] = frame;
            n += 1;
        }

        if n < frames.len() {
            let (sn, smore) = state.source.stream(&mut frames[n..]);
            state.pending[1 - self.side].extend(frames[n..n + sn].iter().copied());
            n += sn;
            more |= smore;
        }
        (n, more)
    }

    fn err(&self) -> Option<StreamError> {
        self.state.lock().source.err()
    }
}
