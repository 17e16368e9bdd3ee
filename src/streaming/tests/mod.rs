//! Tests for streaming functionality.
//!
//! This module contains tests for the streamer contract, compositors, buffers,
//! mixer, watcher and playback gate, plus helpers shared with the unit tests
//! of the other modules.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

use crate::{Frame, StreamError, StreamResult, StreamSeeker, Streamer};

mod watcher_tests;

/// In-memory seekable streamer over a fixed list of frames.
///
/// The cursor is shared through [`DataStreamer::position_handle`] so tests can
/// observe it from inside callbacks that cannot borrow the streamer.
#[derive(Debug, Clone)]
pub(crate) struct DataStreamer {
    data: Arc<[Frame]>,
    pos: Arc<AtomicUsize>,
}

impl DataStreamer {
    pub(crate) fn new(data: Vec<Frame>) -> Self {
        Self {
            data: data.into(),
            pos: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn position_handle(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.pos)
    }
}

impl Streamer for DataStreamer {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let pos = self.pos.load(Ordering::SeqCst);
        if pos >= self.data.len() {
            return (0, false);
        }
        let n = frames.len().min(self.data.len() - pos);
        frames[..n].copy_from_slice(&self.data[pos..pos + n]);
        self.pos.store(pos + n, Ordering::SeqCst);
        (n, true)
    }

    fn err(&self) -> Option<StreamError> {
        None
    }
}

impl StreamSeeker for DataStreamer {
    fn len(&self) -> usize {
        self.data.len()
    }

    fn position(&self) -> usize {
        self.pos.load(Ordering::SeqCst)
    }

    fn seek(&mut self, position: usize) -> StreamResult<()> {
        self.pos.store(position, Ordering::SeqCst);
        Ok(())
    }
}

/// Random frames in `[-1.0, 1.0)` together with a streamer over them.
pub(crate) fn random_data_streamer(num_frames: usize) -> (DataStreamer, Vec<Frame>) {
    let mut rng = rand::thread_rng();
    let data: Vec<Frame> = (0..num_frames)
        .map(|_| [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)])
        .collect();
    (DataStreamer::new(data.clone()), data)
}

/// Frames `[i, i]` for `i` in `0..num_frames`.
pub(crate) fn sequential_data_streamer(num_frames: usize) -> (DataStreamer, Vec<Frame>) {
    let data: Vec<Frame> = (0..num_frames).map(|i| [i as f64, i as f64]).collect();
    (DataStreamer::new(data.clone()), data)
}

/// Streams `limit` frames from the wrapped streamer, then stops and reports
/// `error`.
#[derive(Debug)]
pub(crate) struct DelayedErrorStreamer<S> {
    inner: S,
    remaining: usize,
    error: StreamError,
}

impl<S> DelayedErrorStreamer<S> {
    pub(crate) const fn new(inner: S, limit: usize, error: StreamError) -> Self {
        Self {
            inner,
            remaining: limit,
            error,
        }
    }
}

impl<S: Streamer> Streamer for DelayedErrorStreamer<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if self.remaining == 0 {
            return (0, false);
        }
        let want = frames.len().min(self.remaining);
        let (n, more) = self.inner.stream(&mut frames[..want]);
        self.remaining -= n;
        (n, more)
    }

    fn err(&self) -> Option<StreamError> {
        (self.remaining == 0).then(|| self.error.clone())
    }
}

impl<S: StreamSeeker> StreamSeeker for DelayedErrorStreamer<S> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn position(&self) -> usize {
        self.inner.position()
    }

    fn seek(&mut self, position: usize) -> StreamResult<()> {
        self.inner.seek(position)
    }
}

/// Passes streaming through but fails every seek.
#[derive(Debug)]
pub(crate) struct SeekErrorStreamer<S> {
    inner: S,
    error: StreamError,
}

impl<S> SeekErrorStreamer<S> {
    pub(crate) const fn new(inner: S, error: StreamError) -> Self {
        Self { inner, error }
    }
}

impl<S: Streamer> Streamer for SeekErrorStreamer<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        self.inner.stream(frames)
    }

    fn err(&self) -> Option<StreamError> {
        self.inner.err()
    }
}

impl<S: StreamSeeker> StreamSeeker for SeekErrorStreamer<S> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn position(&self) -> usize {
        self.inner.position()
    }

    fn seek(&mut self, _position: usize) -> StreamResult<()> {
        Err(self.error.clone())
    }
}

/// Immediately exhausted streamer carrying an error.
#[derive(Debug)]
pub(crate) struct ErrorStreamer(pub(crate) StreamError);

impl Streamer for ErrorStreamer {
    fn stream(&mut self, _frames: &mut [Frame]) -> (usize, bool) {
        (0, false)
    }

    fn err(&self) -> Option<StreamError> {
        Some(self.0.clone())
    }
}

/// Drains `s` and returns every frame it streamed.
pub(crate) fn collect<S: Streamer + ?Sized>(s: &mut S) -> Vec<Frame> {
    let mut result = Vec::new();
    let mut buf = [[0.0; 2]; 479];
    loop {
        let (n, more) = s.stream(&mut buf);
        result.extend_from_slice(&buf[..n]);
        if !more {
            return result;
        }
    }
}

/// Streams up to `num` frames from `s`.
pub(crate) fn collect_num<S: Streamer + ?Sized>(num: usize, s: &mut S) -> Vec<Frame> {
    let mut result = Vec::with_capacity(num);
    let mut buf = [[0.0; 2]; 479];
    while result.len() < num {
        let want = buf.len().min(num - result.len());
        let (n, more) = s.stream(&mut buf[..want]);
        result.extend_from_slice(&buf[..n]);
        if !more {
            break;
        }
    }
    result
}

/// Checks frame-by-frame equality within a small tolerance.
pub(crate) fn assert_frames_eq(expected: &[Frame], actual: &[Frame]) {
    const EPSILON: f64 = 1e-9;
    assert_eq!(
        expected.len(),
        actual.len(),
        "frame count mismatch: expected {}, got {}",
        expected.len(),
        actual.len()
    );
    for (i, (e, a)) in expected.iter().zip(actual).enumerate() {
        assert!(
            (e[0] - a[0]).abs() <= EPSILON && (e[1] - a[1]).abs() <= EPSILON,
            "frame {i} differs: expected {e:?}, got {a:?}"
        );
    }
}

/// Verifies the return-value contract of a streamer that is expected to
/// produce exactly `expected` frames without error.
///
/// Reads all but the last 50 frames in full-buffer requests, then expects one
/// short fill of 50 frames followed by idempotent `(0, false)`.
pub(crate) fn assert_streamer_contract<S: Streamer + ?Sized>(s: &mut S, expected: usize) {
    const LEAVE_UNREAD: usize = 50;
    assert!(
        expected > LEAVE_UNREAD,
        "contract check needs more than {LEAVE_UNREAD} frames"
    );

    let mut buf = [[0.0; 2]; 512];
    let mut left = expected - LEAVE_UNREAD;
    while left > 0 {
        let want = buf.len().min(left);
        let (n, more) = s.stream(&mut buf[..want]);
        assert!(more, "streamer drained before it was expected to");
        assert_eq!(n, want, "streamer returned a short fill before its end");
        assert!(s.err().is_none());
        left -= n;
    }

    let (n, more) = s.stream(&mut buf);
    assert!(more);
    assert_eq!(n, LEAVE_UNREAD);
    assert!(s.err().is_none());

    for _ in 0..2 {
        let (n, more) = s.stream(&mut buf);
        assert!(!more);
        assert_eq!(n, 0);
        assert!(s.err().is_none());
    }
}
