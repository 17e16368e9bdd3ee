//! Variable-ratio sample-rate conversion with Lagrange interpolation.
//!
//! [`Resampler`] reads a source at one rate and streams it at another. The
//! ratio between the two can be changed while streaming without any jump in
//! the source position, which makes it usable for speed and pitch effects as
//! well as plain rate conversion.
//!
//! Choosing a quality:
//!
//! | quality | use case                                             |
//! |---------|------------------------------------------------------|
//! | 1       | on-the-fly resampling, low quality                   |
//! | 3-4     | on-the-fly resampling, good quality                  |
//! | 6       | higher CPU usage, very good quality                  |
//! | >6      | offline resampling, negligible further improvements  |

use tracing::{debug, trace};

use crate::streaming::error::StreamError;
use crate::streaming::traits::{BoxedStreamer, Streamer, fill};
use crate::{ConfigError, ConfigResult, Frame, SILENCE, SampleRate};

/// Source frames held by each of the two rotating read buffers.
const BLOCK: usize = 512;

/// Evaluates at `x` the polynomial passing through every `(x, y)` point.
pub(crate) fn lagrange(points: &[(f64, f64)], x: f64) -> f64 {
    let mut y = 0.0;
    for (j, &(xj, yj)) in points.iter().enumerate() {
        let mut l = 1.0;
        for (m, &(xm, _)) in points.iter().enumerate() {
            if j == m {
                continue;
            }
            l *= (x - xm) / (xj - xm);
        }
        y += yj * l;
    }
    y
}

fn validate_ratio(ratio: f64) -> ConfigResult<()> {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(ConfigError::InvalidRatio(ratio));
    }
    Ok(())
}

/// Streams a source resampled by `old rate / new rate`.
///
/// Each output frame is interpolated per channel from the `2 * quality`
/// source frames closest to its position in the source. Source errors are
/// passed through [`Streamer::err`].
#[derive(Debug)]
pub struct Resampler<S = BoxedStreamer> {
    source: S,
    ratio: f64,
    /// The block before `current`, kept for windows straddling a boundary.
    previous: Vec<Frame>,
    current: Vec<Frame>,
    points: Vec<(f64, f64)>,
    /// Source index of `current[0]`.
    offset: isize,
    /// Output position in resampled frames.
    position: f64,
    /// Source index one past the last frame, once the source is drained.
    end: Option<isize>,
}

impl<S: Streamer> Resampler<S> {
    /// Lowest accepted quality.
    pub const MIN_QUALITY: usize = 1;
    /// Highest accepted quality.
    pub const MAX_QUALITY: usize = 64;

    /// Resamples `source` from `old` to `new`.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidQuality`] if `quality` is outside
    /// `1..=64`, or [`ConfigError::InvalidRatio`] if either rate is zero.
    pub fn new(quality: usize, old: SampleRate, new: SampleRate, source: S) -> ConfigResult<Self> {
        Self::with_ratio(quality, f64::from(old.get()) / f64::from(new.get()), source)
    }

    /// Resamples `source` by `ratio`, the old rate divided by the new one.
    ///
    /// Played back at the original rate, a ratio of 2 doubles the speed.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidQuality`] if `quality` is outside
    /// `1..=64`, or [`ConfigError::InvalidRatio`] if `ratio` is not finite and
    /// positive.
    pub fn with_ratio(quality: usize, ratio: f64, source: S) -> ConfigResult<Self> {
        if !(Self::MIN_QUALITY..=Self::MAX_QUALITY).contains(&quality) {
            return Err(ConfigError::InvalidQuality {
                quality,
                min: Self::MIN_QUALITY,
                max: Self::MAX_QUALITY,
            });
        }
        validate_ratio(ratio)?;
        Ok(Self {
            source,
            ratio,
            previous: vec![SILENCE; BLOCK],
            current: vec![SILENCE; BLOCK],
            points: vec![(0.0, 0.0); quality * 2],
            // Both blocks start out behind position 0 so the first pull loads
            // `current` from the source and moves `offset` to 0.
            offset: -(BLOCK as isize),
            position: 0.0,
            end: None,
        })
    }

    /// The current ratio of old rate to new rate.
    pub const fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Changes the ratio, keeping the position in the source unchanged.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidRatio`] if `ratio` is not finite and
    /// positive. The resampler is left unchanged in that case.
    pub fn set_ratio(&mut self, ratio: f64) -> ConfigResult<()> {
        validate_ratio(ratio)?;
        self.position *= self.ratio / ratio;
        debug!(old = self.ratio, new = ratio, "resampling ratio changed");
        self.ratio = ratio;
        Ok(())
    }

    /// Unwraps the source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Loads blocks until `window_end` is covered or the source is drained.
    fn load_until(&mut self, window_end: isize) {
        let block = BLOCK as isize;
        while self.end.is_none() && window_end > self.offset + block {
            let (filled, more) = fill(&mut self.source, &mut self.previous);
            if filled < BLOCK || !more {
                let end = self.offset + block + filled as isize;
                debug!(end, "resampler source drained");
                self.end = Some(end);
            }
            std::mem::swap(&mut self.previous, &mut self.current);
            self.offset += block;
            trace!(offset = self.offset, filled, "rotated resampler block");
        }
    }

    fn sample(&self, x: isize, channel: usize) -> f64 {
        if x < self.offset {
            self.previous[(x - (self.offset - BLOCK as isize)) as usize][channel]
        } else {
            self.current[(x - self.offset) as usize][channel]
        }
    }
}

impl<S: Streamer> Streamer for Resampler<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let window = self.points.len() as isize;
        let mut n = 0;

        for frame in frames.iter_mut() {
            let want_pos = self.position * self.ratio;
            let floor = want_pos as isize;
            let mut window_start = floor - (window - 1) / 2;
            let mut window_end = floor + window / 2 + 1;

            self.load_until(window_end);

            if let Some(end) = self.end {
                if floor >= end {
                    return (n, n > 0);
                }
                window_end = window_end.min(end);
            }
            window_start = window_start.max(0);

            let num_points = (window_end - window_start) as usize;
            for (channel, value) in frame.iter_mut().enumerate() {
                for i in 0..num_points {
                    let x = window_start + i as isize;
                    let y = self.sample(x, channel);
                    self.points[i] = (x as f64, y);
                }
                *value = lagrange(&self.points[..num_points], want_pos);
            }

            n += 1;
            self.position += 1.0;
        }
        (n, true)
    }

    fn err(&self) -> Option<StreamError> {
        self.source.err()
    }
}
