//! Core traits for pull-based audio streaming.

use super::error::{StreamError, StreamResult};
use crate::Frame;

/// A pull-based producer of [`Frame`]s.
///
/// Callers hand in a buffer of capacity `K` and receive `(n, more)`:
///
/// - `n` frames were written into `frames[..n]`, `0 <= n <= K`.
/// - `more == true` means the caller should call again. A streamer that has
///   not run out of data fills the whole buffer and returns `(K, true)`. A
///   short fill `(n, true)` with `0 < n < K` happens at the true end of the
///   data or at an internal boundary.
/// - `more == false` means the streamer is permanently exhausted and every
///   further call returns `(0, false)`.
///
/// `(0, true)` is never returned for a non-empty buffer.
///
/// Errors are out of band: once `more == false` has been returned,
/// [`Streamer::err`] reports the sticky error, if any. While the streamer is
/// still active it reports `None`.
pub trait Streamer {
    /// Fills `frames` with the next frames of the stream.
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool);

    /// Returns the sticky error of this streamer, if any.
    fn err(&self) -> Option<StreamError>;
}

/// A [`Streamer`] with a known length that supports absolute repositioning.
pub trait StreamSeeker: Streamer {
    /// Total number of frames.
    fn len(&self) -> usize;

    /// Check if the streamer holds no frames at all.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current absolute position in frames.
    fn position(&self) -> usize;

    /// Moves the cursor to the absolute frame `position`.
    fn seek(&mut self, position: usize) -> StreamResult<()>;
}

/// Owned, type-erased streamer that may be moved to another thread.
pub type BoxedStreamer = Box<dyn Streamer + Send>;

/// Owned, type-erased seekable streamer that may be moved to another thread.
pub type BoxedStreamSeeker = Box<dyn StreamSeeker + Send>;

impl<S: Streamer + ?Sized> Streamer for Box<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        (**self).stream(frames)
    }

    fn err(&self) -> Option<StreamError> {
        (**self).err()
    }
}

impl<S: StreamSeeker + ?Sized> StreamSeeker for Box<S> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn seek(&mut self, position: usize) -> StreamResult<()> {
        (**self).seek(position)
    }
}

impl<S: Streamer + ?Sized> Streamer for &mut S {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        (**self).stream(frames)
    }

    fn err(&self) -> Option<StreamError> {
        (**self).err()
    }
}

impl<S: StreamSeeker + ?Sized> StreamSeeker for &mut S {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn seek(&mut self, position: usize) -> StreamResult<()> {
        (**self).seek(position)
    }
}

/// Pulls from `source` until `frames` is full or the source is exhausted.
///
/// Returns the number of frames filled and whether the source may still
/// produce more.
pub(crate) fn fill<S: Streamer + ?Sized>(source: &mut S, frames: &mut [Frame]) -> (usize, bool) {
    let mut filled = 0;
    while filled < frames.len() {
        let (n, more) = source.stream(&mut frames[filled..]);
        filled += n;
        if !more {
            return (filled, false);
        }
        if n == 0 {
            break;
        }
    }
    (filled, true)
}
