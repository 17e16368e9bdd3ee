//! Error types for streaming operations.
//!
//! Configuration problems are rejected at construction time with
//! [`ConfigError`](crate::ConfigError) and never show up here.

/// Errors a streamer stores in its sticky error slot.
///
/// A streamer reports its error through [`Streamer::err`](crate::Streamer::err)
/// once it has returned `more == false`. Errors are never cleared.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// I/O failure in an underlying reader
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Seek target outside of the addressable range
    #[error("Seek position {position} out of range [0, {len}]")]
    SeekOutOfRange {
        /// Requested position in frames.
        position: usize,
        /// Length of the seekable streamer in frames.
        len: usize,
    },

    /// Malformed data from a decoder
    #[error("Decode error: {0}")]
    Decode(String),

    /// Any other failure reported by a source streamer
    #[error("Source error: {0}")]
    Source(String),
}

impl StreamError {
    /// Create a seek out of range error
    pub const fn seek_out_of_range(position: usize, len: usize) -> Self {
        Self::SeekOutOfRange { position, len }
    }

    /// Create a decode error
    pub fn decode(details: impl Into<String>) -> Self {
        Self::Decode(details.into())
    }

    /// Create a generic source error
    pub fn source_failure(details: impl Into<String>) -> Self {
        Self::Source(details.into())
    }

    /// Check if retrying on a fresh streamer could succeed.
    ///
    /// I/O failures and out of range seeks depend on the caller or the
    /// environment; decode and source errors are properties of the data.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::SeekOutOfRange { .. })
    }
}

impl Clone for StreamError {
    fn clone(&self) -> Self {
        match self {
            Self::Io(err) => Self::Io(std::io::Error::new(err.kind(), err.to_string())),
            Self::SeekOutOfRange { position, len } => Self::SeekOutOfRange {
                position: *position,
                len: *len,
            },
            Self::Decode(msg) => Self::Decode(msg.clone()),
            Self::Source(msg) => Self::Source(msg.clone()),
        }
    }
}

/// Result type for streaming operations
pub type StreamResult<T> = Result<T, StreamError>;
