//! Error types for construction-time configuration failures.

use thiserror::Error;

/// Convenience type alias for results that may contain a [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors reported when a component is built or reconfigured with invalid
/// parameters.
///
/// These are never surfaced mid-stream; a streamer that was constructed
/// successfully only ever reports [`StreamError`](crate::StreamError)s.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Resampling quality outside the supported range.
    #[error("invalid resampling quality {quality}: must be between {min} and {max}")]
    InvalidQuality {
        /// The rejected quality.
        quality: usize,
        /// Smallest accepted quality.
        min: usize,
        /// Largest accepted quality.
        max: usize,
    },

    /// Resampling ratio that is not finite and strictly positive.
    #[error("invalid resampling ratio {0}: must be finite and greater than zero")]
    InvalidRatio(f64),

    /// Loop section starting at or after the end of the source.
    #[error(
        "invalid loop section: start position {start} must be smaller than the source length {len}"
    )]
    InvalidLoopStart {
        /// Requested section start.
        start: usize,
        /// Length of the source in frames.
        len: usize,
    },

    /// Loop section whose start is not before its end.
    #[error("invalid loop section: start position {start} must be smaller than the end position {end}")]
    InvalidLoopRange {
        /// Requested section start.
        start: usize,
        /// Requested section end.
        end: usize,
    },

    /// Unsupported PCM layout.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Frame range outside of the addressed storage.
    #[error("range {start}..{end} is out of bounds for length {len}")]
    RangeOutOfBounds {
        /// First frame of the range.
        start: usize,
        /// One past the last frame of the range.
        end: usize,
        /// Available frames.
        len: usize,
    },
}
