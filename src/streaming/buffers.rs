//! Encoded in-memory storage for streamed audio.
//!
//! A [`Buffer`] stores frames as raw bytes in a fixed [`Format`] and decodes
//! them again on readout through [`BufferStreamer`] views.
//!
//! Storage is a queue of immutable segments, one per append. Views share the
//! segments they cover instead of copying bytes, so they stay valid and
//! unchanged while the buffer keeps growing or shrinking, and neither
//! `append` nor `pop` ever copies previously stored frames.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, warn};

use super::error::{StreamError, StreamResult};
use super::traits::{StreamSeeker, Streamer};
use crate::{ConfigError, ConfigResult, Format, Frame, SILENCE};

/// Frames pulled from a source per append step.
const APPEND_CHUNK: usize = 512;

/// Encoded frames written by a single append.
type Segment = Arc<[u8]>;

/// Append-only, front-poppable store of encoded frames.
///
/// The live byte count over all segments is always
/// `len() * format().width()`.
#[derive(Debug, Clone)]
pub struct Buffer {
    format: Format,
    segments: VecDeque<Segment>,
    // Bytes already popped from the front segment.
    head: usize,
    len: usize,
}

impl Buffer {
    /// Creates an empty buffer storing frames in `format`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidFormat`] if the format has no channels or
    /// an unsupported precision.
    pub fn new(format: Format) -> ConfigResult<Self> {
        if !format.is_codec_compatible() {
            return Err(ConfigError::InvalidFormat(format!(
                "cannot store frames with {} channels of {} bytes",
                format.num_channels, format.precision
            )));
        }
        Ok(Self {
            format,
            segments: VecDeque::new(),
            head: 0,
            len: 0,
        })
    }

    /// The storage format.
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Number of frames stored.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if no frames are stored.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Pulls `source` until it is exhausted and stores everything it streamed.
    ///
    /// Returns the number of frames appended.
    ///
    /// # Errors
    /// Returns the source's error if it reports one after draining. Frames
    /// streamed before that point stay in the buffer.
    pub fn append<S: Streamer + ?Sized>(&mut self, source: &mut S) -> StreamResult<usize> {
        let format = self.format;
        let width = format.width();
        let mut data = Vec::new();
        let mut chunk = [SILENCE; APPEND_CHUNK];

        loop {
            let (n, more) = source.stream(&mut chunk);
            let offset = data.len();
            data.resize(offset + n * width, 0);
            for (frame, out) in chunk[..n].iter().zip(data[offset..].chunks_exact_mut(width)) {
                format.encode_signed(out, *frame);
            }

            if !more {
                break;
            }
        }

        let appended = data.len() / width;
        if appended > 0 {
            self.segments.push_back(Segment::from(data));
            self.len += appended;
        }

        if let Some(err) = source.err() {
            warn!(appended, %err, "source failed while appending to buffer");
            return Err(err);
        }
        debug!(
            appended,
            total = self.len,
            segments = self.segments.len(),
            "appended frames to buffer"
        );
        Ok(appended)
    }

    /// Removes up to `n` frames from the front.
    pub fn pop(&mut self, n: usize) {
        let n = n.min(self.len);
        self.len -= n;
        self.head += n * self.format.width();
        while let Some(front) = self.segments.front() {
            if self.head < front.len() {
                break;
            }
            self.head -= front.len();
            self.segments.pop_front();
        }
    }

    /// Returns a seekable view that decodes the frames in `[start, end)`.
    ///
    /// # Errors
    /// Returns [`ConfigError::RangeOutOfBounds`] unless
    /// `start <= end <= len()`.
    pub fn streamer(&self, start: usize, end: usize) -> ConfigResult<BufferStreamer> {
        let len = self.len();
        if start > end || end > len {
            return Err(ConfigError::RangeOutOfBounds { start, end, len });
        }

        let width = self.format.width();
        let (lo, hi) = (start * width, end * width);
        let mut spans = Vec::new();
        let mut ends = Vec::new();
        let mut covered = 0;
        let mut offset = 0;
        for (i, segment) in self.segments.iter().enumerate() {
            if offset >= hi {
                break;
            }
            let skip = if i == 0 { self.head } else { 0 };
            let live = segment.len() - skip;
            let from = lo.max(offset);
            let to = hi.min(offset + live);
            if from < to {
                spans.push(Span {
                    segment: Arc::clone(segment),
                    from: skip + from - offset,
                    to: skip + to - offset,
                });
                covered += (to - from) / width;
                ends.push(covered);
            }
            offset += live;
        }

        Ok(BufferStreamer {
            format: self.format,
            spans: spans.into(),
            ends: ends.into(),
            len: end - start,
            position: 0,
        })
    }
}

/// Byte range of a shared segment.
#[derive(Debug, Clone)]
struct Span {
    segment: Segment,
    from: usize,
    to: usize,
}

impl Span {
    fn bytes(&self) -> &[u8] {
        &self.segment[self.from..self.to]
    }
}

/// Read-only, seekable view into a [`Buffer`].
///
/// Positions are relative to the start of the view.
#[derive(Debug, Clone)]
pub struct BufferStreamer {
    format: Format,
    spans: Arc<[Span]>,
    // Frame index one past the end of each span, relative to the view.
    ends: Arc<[usize]>,
    len: usize,
    position: usize,
}

impl Streamer for BufferStreamer {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let remaining = self.len() - self.position;
        if remaining == 0 {
            return (0, false);
        }

        let width = self.format.width();
        let n = frames.len().min(remaining);
        let mut done = 0;
        while done < n {
            let i = self.ends.partition_point(|&e| e <= self.position);
            let span_start = if i == 0 { 0 } else { self.ends[i - 1] };
            let k = (n - done).min(self.ends[i] - self.position);
            let from = (self.position - span_start) * width;
            let bytes = &self.spans[i].bytes()[from..from + k * width];
            for (frame, encoded) in frames[done..done + k].iter_mut().zip(bytes.chunks_exact(width)) {
                *frame = self.format.decode_signed(encoded).0;
            }
            done += k;
            self.position += k;
        }
        (n, true)
    }

    fn err(&self) -> Option<StreamError> {
        None
    }
}

impl StreamSeeker for BufferStreamer {
    fn len(&self) -> usize {
        self.len
    }

    fn position(&self) -> usize {
        self.position
    }

    fn seek(&mut self, position: usize) -> StreamResult<()> {
        let len = self.len();
        if position > len {
            return Err(StreamError::seek_out_of_range(position, len));
        }
        self.position = position;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Silence;
    use crate::streaming::tests::{assert_frames_eq, collect, sequential_data_streamer};

    fn lossless_buffer() -> Buffer {
        Buffer::new(Format::new(44_100, 2, 8).unwrap()).unwrap()
    }

    #[test]
    fn test_views_share_segments_with_the_buffer() {
        let mut buffer = lossless_buffer();
        buffer.append(&mut Silence::new(100)).unwrap();
        let view = buffer.streamer(0, 100).unwrap();

        for _ in 0..10 {
            buffer.append(&mut Silence::new(100)).unwrap();
        }
        assert_eq!(buffer.segments.len(), 11);
        assert!(Arc::ptr_eq(&view.spans[0].segment, &buffer.segments[0]));
    }

    #[test]
    fn test_pop_releases_whole_segments_only() {
        let mut buffer = lossless_buffer();
        for _ in 0..3 {
            buffer.append(&mut Silence::new(10)).unwrap();
        }

        buffer.pop(15);
        assert_eq!(buffer.len(), 15);
        assert_eq!(buffer.segments.len(), 2);
        assert_eq!(buffer.head, 5 * buffer.format.width());

        buffer.pop(5);
        assert_eq!(buffer.segments.len(), 1);
        assert_eq!(buffer.head, 0);

        buffer.pop(100);
        assert!(buffer.is_empty());
        assert!(buffer.segments.is_empty());
    }

    #[test]
    fn test_view_spans_several_segments() {
        let (mut source, data) = sequential_data_streamer(30);
        let mut buffer = lossless_buffer();
        for _ in 0..3 {
            let mut part = crate::Take::new(10, &mut source);
            buffer.append(&mut part).unwrap();
        }
        assert_eq!(buffer.segments.len(), 3);
        buffer.pop(4);

        let mut view = buffer.streamer(3, 24).unwrap();
        assert_eq!(view.spans.len(), 3);
        assert_frames_eq(&data[7..28], &collect(&mut view));

        view.seek(13).unwrap();
        let mut buf = [SILENCE; 4];
        assert_eq!(view.stream(&mut buf), (4, true));
        assert_frames_eq(&data[20..24], &buf);
    }

    #[test]
    fn test_empty_view() {
        let mut buffer = lossless_buffer();
        buffer.append(&mut Silence::new(10)).unwrap();
        let mut view = buffer.streamer(4, 4).unwrap();
        let mut buf = [SILENCE; 4];
        assert_eq!(view.stream(&mut buf), (0, false));
        assert!(view.spans.is_empty());
    }
}
