//! Pull-based streaming and composition of audio.
//!
//! Everything in this module is built on the [`Streamer`] contract: a
//! consumer hands a buffer of [`Frame`](crate::Frame)s to a streamer, which
//! fills a prefix of it and says whether more frames will follow. Compositors
//! own their children and pull from them recursively, so a whole playback
//! graph is driven by the thread that pulls from its root.
//!
//! # Overview
//!
//! - [`compositors`]: [`Take`], [`Loop`], [`SectionLoop`], [`Seq`],
//!   [`Iterate`], [`Callback`] and [`dup`]
//! - [`mixer`]: [`Mixer`], summing a dynamic set of streamers
//! - [`watcher`]: [`Watcher`], running callbacks at frame positions
//! - [`ctrl`]: [`Ctrl`], a pause gate
//! - [`buffers`]: [`Buffer`], encoded in-memory storage with seekable views
//! - [`sources`]: generated sources such as [`Silence`]
//!
//! # Example
//!
//! ```
//! use audio_compose::streaming::*;
//! use audio_compose::{Format, SILENCE};
//!
//! let mut buffer = Buffer::new(Format::cd_quality()).unwrap();
//! buffer.append(&mut Silence::new(300)).unwrap();
//!
//! let mut looped = Loop::new(2, buffer.streamer(0, 300).unwrap());
//! let mut frames = [SILENCE; 1000];
//! assert_eq!(looped.stream(&mut frames), (600, true));
//! assert_eq!(looped.stream(&mut frames), (0, false));
//! ```

pub mod buffers;
pub mod compositors;
pub mod ctrl;
pub mod error;
pub mod mixer;
pub mod sources;
pub mod traits;
pub mod watcher;

// Re-export main types for convenience
pub use buffers::{Buffer, BufferStreamer};
pub use compositors::{Callback, Dup, Iterate, Loop, LoopOptions, SectionLoop, Seq, Take, dup};
pub use ctrl::Ctrl;
pub use error::{StreamError, StreamResult};
pub use mixer::Mixer;
pub use sources::Silence;
pub use traits::{BoxedStreamSeeker, BoxedStreamer, StreamSeeker, Streamer};
pub use watcher::Watcher;

#[cfg(test)]
pub(crate) mod tests;
