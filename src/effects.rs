//! Effects applied on top of a streamer.

use crate::streaming::error::StreamError;
use crate::streaming::traits::{BoxedStreamer, Streamer};
use crate::Frame;

/// Shape of a gain ramp, mapping progress in `[0, 1]` to a ramp value in
/// `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionCurve {
    /// Gain changes at a constant rate.
    #[default]
    Linear,
    /// Square-root ramp. Two opposite equal-power transitions mixed together
    /// keep the perceived loudness constant, which suits cross-fades.
    EqualPower,
}

impl TransitionCurve {
    /// Evaluates the curve at `progress`, clamped to `[0, 1]`.
    pub fn apply(self, progress: f64) -> f64 {
        let progress = num_traits::clamp(progress, 0.0, 1.0);
        match self {
            Self::Linear => progress,
            Self::EqualPower => progress.sqrt(),
        }
    }
}

/// Ramps the gain of a streamer from `start_gain` to `end_gain` over
/// `duration` frames, holding `end_gain` afterwards.
#[derive(Debug)]
pub struct Transition<S = BoxedStreamer> {
    source: S,
    position: usize,
    duration: usize,
    start_gain: f64,
    end_gain: f64,
    curve: TransitionCurve,
}

impl<S: Streamer> Transition<S> {
    /// Creates a gain ramp over the first `duration` frames of `source`.
    ///
    /// A `duration` of zero applies `end_gain` from the first frame on.
    pub const fn new(
        source: S,
        duration: usize,
        start_gain: f64,
        end_gain: f64,
        curve: TransitionCurve,
    ) -> Self {
        Self {
            source,
            position: 0,
            duration,
            start_gain,
            end_gain,
            curve,
        }
    }

    /// Gain applied to the frame at `position`.
    fn gain_at(&self, position: usize) -> f64 {
        let progress = if self.duration == 0 {
            1.0
        } else {
            position as f64 / self.duration as f64
        };
        self.start_gain + (self.end_gain - self.start_gain) * self.curve.apply(progress)
    }
}

impl<S: Streamer> Streamer for Transition<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        let (n, more) = self.source.stream(frames);
        for (i, frame) in frames[..n].iter_mut().enumerate() {
            let gain = self.gain_at(self.position + i);
            frame[0] *= gain;
            frame[1] *= gain;
        }
        self.position += n;
        (n, more)
    }

    fn err(&self) -> Option<StreamError> {
        self.source.err()
    }
}
