//! Audio source implementations for streaming.

pub mod generator;

pub use generator::Silence;
