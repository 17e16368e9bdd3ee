// Correctness and logic
#![warn(clippy::unit_cmp)] // Detects comparing unit types
#![warn(clippy::match_same_arms)]
// Duplicate match arms

// Performance-focused
#![warn(clippy::inefficient_to_string)] // `format!("{}", x)` vs `x.to_string()`
#![warn(clippy::map_clone)] // Cloning inside `map()` unnecessarily
#![warn(clippy::unnecessary_to_owned)] // Detects redundant `.to_owned()` or `.clone()`
#![warn(clippy::large_stack_arrays)] // Helps avoid stack overflows
#![warn(clippy::box_collection)] // Warns on boxed `Vec`, `String`, etc.
#![warn(clippy::needless_collect)] // Avoids `.collect().iter()` chains

// Style and idiomatic Rust
#![warn(clippy::redundant_clone)] // Detects unnecessary `.clone()`
#![warn(clippy::identity_op)] // e.g., `x + 0`, `x * 1`
#![warn(clippy::needless_return)] // Avoids `return` at the end of functions
#![warn(clippy::let_unit_value)] // Avoids binding `()` to variables
#![warn(clippy::manual_map)] // Use `.map()` instead of manual `match`
#![warn(clippy::unwrap_used)] // Avoids using `unwrap()`

// Maintainability
#![warn(clippy::missing_panics_doc)] // Docs for functions that might panic
#![warn(clippy::missing_const_for_fn)] // Suggests making eligible functions `const`
#![warn(missing_docs)]

//! # audio_compose
//!
//! Composable, pull-based audio streaming: a small set of building blocks
//! that are plugged together into a playback graph and driven by whoever
//! pulls frames from its root.
//!
//! ## Overview
//!
//! Audio moves through the graph as stereo [`Frame`]s of `f64` samples in
//! `[-1, 1]`. Every node implements [`Streamer`]:
//!
//! - the [codec](crate::conversions) turns frames into little-endian PCM
//!   bytes of a given [`Format`] and back
//! - [`Buffer`] stores encoded audio and hands out seekable views
//! - compositors such as [`Take`], [`Loop`], [`SectionLoop`], [`Seq`] and
//!   [`dup`] cut, repeat, chain and split streams
//! - [`Mixer`] sums a dynamic set of streamers
//! - [`Resampler`] converts between sample rates, with a ratio that can change
//!   while playing
//! - [`Watcher`] runs callbacks at frame positions
//! - [`Ctrl`] pauses and resumes playback
//!
//! ## Example
//!
//! ```
//! use audio_compose::{
//!     BoxedStreamer, Mixer, Resampler, SILENCE, SampleRate, Seq, Silence, Streamer, Take,
//! };
//!
//! # fn main() -> Result<(), audio_compose::ConfigError> {
//! let intro = Take::new(441, Silence::infinite());
//! let body = Resampler::new(4, SampleRate(48_000), SampleRate(44_100), Silence::new(4_800))?;
//! let parts: Vec<BoxedStreamer> = vec![Box::new(intro), Box::new(body)];
//!
//! let mut mixer = Mixer::new();
//! mixer.add(Seq::new(parts));
//!
//! let mut frames = [SILENCE; 512];
//! assert_eq!(mixer.stream(&mut frames), (512, true));
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`SampleRate`], [`Format`],
//!   [`LoopOptions`] and [`TransitionCurve`]
//!
//! ## Errors
//!
//! Invalid parameters are rejected when a component is built, with a
//! [`ConfigError`]. Failures while streaming are reported out of band: a
//! streamer that stops early exposes the cause through [`Streamer::err`] as a
//! [`StreamError`].

pub mod conversions;
pub mod effects;
mod error;
mod repr;
pub mod resampling;
pub mod streaming;

pub use crate::effects::{Transition, TransitionCurve};
pub use crate::error::{ConfigError, ConfigResult};
pub use crate::repr::{Format, Frame, SILENCE, SampleRate};
pub use crate::resampling::Resampler;
pub use crate::streaming::{
    BoxedStreamSeeker, BoxedStreamer, Buffer, BufferStreamer, Callback, Ctrl, Dup, Iterate, Loop,
    LoopOptions, Mixer, SectionLoop, Seq, Silence, StreamError, StreamResult, StreamSeeker,
    Streamer, Take, Watcher, dup,
};

/// Left channel index.
pub const LEFT: usize = 0;
/// Right channel index.
pub const RIGHT: usize = 1;
