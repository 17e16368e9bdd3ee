//! Core data model: frames, sample rates and PCM formats.

use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// One stereo sample as `[left, right]`, nominally in `[-1.0, 1.0]`.
///
/// Values outside the nominal range are allowed while streaming (for example
/// after mixing several loud streamers); they are clamped when encoded.
pub type Frame = [f64; 2];

/// A frame of silence.
pub const SILENCE: Frame = [0.0, 0.0];

/// Number of frames per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// Returns the duration of `frames` frames at this sample rate.
    pub fn duration(self, frames: usize) -> Duration {
        if self.0 == 0 {
            return Duration::ZERO;
        }
        let nanos = frames as u128 * 1_000_000_000 / u128::from(self.0);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Returns the number of whole frames that fit in `duration`.
    pub fn frames(self, duration: Duration) -> usize {
        let frames = duration.as_nanos() * u128::from(self.0) / 1_000_000_000;
        usize::try_from(frames).unwrap_or(usize::MAX)
    }

    /// Returns the sample rate in Hz.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for SampleRate {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Describes how frames are laid out as PCM bytes.
///
/// Samples are little-endian, `precision` bytes per channel sample, with
/// channels interleaved. A frame therefore occupies [`Format::width`] bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Format {
    /// Frames per second.
    pub sample_rate: SampleRate,
    /// Number of interleaved channels per frame.
    pub num_channels: usize,
    /// Bytes per channel sample, 1 to 8.
    pub precision: usize,
}

impl Format {
    /// Largest supported number of bytes per channel sample.
    pub const MAX_PRECISION: usize = 8;

    /// Creates a validated format.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidFormat`] if `num_channels` is zero or
    /// `precision` is outside `1..=8`.
    pub fn new(sample_rate: u32, num_channels: usize, precision: usize) -> ConfigResult<Self> {
        if num_channels == 0 {
            return Err(ConfigError::InvalidFormat(
                "number of channels must be at least 1".to_string(),
            ));
        }
        if !(1..=Self::MAX_PRECISION).contains(&precision) {
            return Err(ConfigError::InvalidFormat(format!(
                "precision must be between 1 and {} bytes, got {precision}",
                Self::MAX_PRECISION
            )));
        }
        Ok(Self {
            sample_rate: SampleRate(sample_rate),
            num_channels,
            precision,
        })
    }

    /// 44.1 kHz, stereo, 16-bit.
    pub const fn cd_quality() -> Self {
        Self {
            sample_rate: SampleRate(44_100),
            num_channels: 2,
            precision: 2,
        }
    }

    /// Bytes per frame.
    pub const fn width(&self) -> usize {
        self.precision * self.num_channels
    }

    pub(crate) const fn is_codec_compatible(&self) -> bool {
        self.num_channels >= 1 && self.precision >= 1 && self.precision <= Self::MAX_PRECISION
    }
}
