//! # Sample Format Codec
//!
//! Conversion between [`Frame`]s and little-endian PCM bytes, exposed as
//! methods on [`Format`]:
//!
//! - [`decode_signed`](Format::decode_signed) / [`encode_signed`](Format::encode_signed)
//!   for two's complement samples
//! - [`decode_unsigned`](Format::decode_unsigned) / [`encode_unsigned`](Format::encode_unsigned)
//!   for offset-binary samples (e.g. 8-bit WAV)
//!
//! For an `N`-byte sample the scale is `s = 2^(8N-1)`. Signed values decode
//! as `v / s` and unsigned values as `(u - s) / s`, so the decoded range is
//! `[-1.0, 1.0 - 1/s]`: full negative scale, but positive full scale is one
//! least significant bit short of `1.0`. Encoding clamps to `[-1.0, 1.0]`
//! first, so `1.0` encodes to the largest positive integer.
//!
//! ```rust
//! use audio_compose::Format;
//!
//! let format = Format::new(44_100, 1, 2).unwrap();
//! let (frame, consumed) = format.decode_signed(&[0x00, 0x80]);
//! assert_eq!(consumed, 2);
//! assert_eq!(frame, [-1.0, -1.0]); // mono samples are duplicated
//!
//! let mut bytes = [0u8; 2];
//! assert_eq!(format.encode_signed(&mut bytes, [1.0, 1.0]), 2);
//! assert_eq!(bytes, [0xFF, 0x7F]);
//! ```
//!
//! Mono formats duplicate the decoded sample into both channels and encode
//! only the left channel. Formats with more than two channels encode the
//! extra channels as silence and skip them on decode.
//!
//! Byte slices shorter than [`Format::width`] (or formats with a precision
//! outside `1..=8`) are a caller error; these functions then consume or
//! write nothing and return `0` instead of panicking.

use num_traits::clamp;

use crate::{Format, Frame, SILENCE};

impl Format {
    /// Decodes one frame of two's complement samples from the front of `bytes`.
    ///
    /// Returns the frame and the number of bytes consumed, which is
    /// [`Format::width`] on success.
    pub fn decode_signed(&self, bytes: &[u8]) -> (Frame, usize) {
        self.decode(true, bytes)
    }

    /// Decodes one frame of offset-binary samples from the front of `bytes`.
    ///
    /// Returns the frame and the number of bytes consumed, which is
    /// [`Format::width`] on success.
    pub fn decode_unsigned(&self, bytes: &[u8]) -> (Frame, usize) {
        self.decode(false, bytes)
    }

    /// Encodes `frame` as two's complement samples into the front of `out`.
    ///
    /// Returns the number of bytes written.
    pub fn encode_signed(&self, out: &mut [u8], frame: Frame) -> usize {
        self.encode(true, out, frame)
    }

    /// Encodes `frame` as offset-binary samples into the front of `out`.
    ///
    /// Returns the number of bytes written.
    pub fn encode_unsigned(&self, out: &mut [u8], frame: Frame) -> usize {
        self.encode(false, out, frame)
    }

    fn decode(&self, signed: bool, bytes: &[u8]) -> (Frame, usize) {
        let width = self.width();
        if !self.is_codec_compatible() || bytes.len() < width {
            return (SILENCE, 0);
        }

        let mut frame = SILENCE;
        for (channel, sample) in bytes[..width].chunks_exact(self.precision).enumerate() {
            if channel >= frame.len() {
                break;
            }
            frame[channel] = decode_sample(signed, sample);
        }
        if self.num_channels == 1 {
            frame[1] = frame[0];
        }
        (frame, width)
    }

    fn encode(&self, signed: bool, out: &mut [u8], frame: Frame) -> usize {
        let width = self.width();
        if !self.is_codec_compatible() || out.len() < width {
            return 0;
        }

        for (channel, sample) in out[..width].chunks_exact_mut(self.precision).enumerate() {
            let value = frame.get(channel).copied().unwrap_or(0.0);
            encode_sample(signed, sample, clamp(value, -1.0, 1.0));
        }
        width
    }
}

/// Largest raw value that fits in `bits` bits.
const fn mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}

/// `2^(bits - 1)`, the scale shared by signed and unsigned samples.
fn half_scale(bits: u32) -> f64 {
    (1u64 << (bits - 1)) as f64
}

fn decode_sample(signed: bool, bytes: &[u8]) -> f64 {
    let raw = bytes
        .iter()
        .rev()
        .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte));
    let bits = bytes.len() as u32 * 8;
    if signed {
        signed_to_float(bits, raw)
    } else {
        unsigned_to_float(bits, raw)
    }
}

fn encode_sample(signed: bool, out: &mut [u8], value: f64) {
    let bits = out.len() as u32 * 8;
    let mut raw = if signed {
        float_to_signed(bits, value)
    } else {
        float_to_unsigned(bits, value)
    };
    for byte in out.iter_mut() {
        *byte = raw as u8;
        raw >>= 8;
    }
}

fn signed_to_float(bits: u32, raw: u64) -> f64 {
    let shift = u64::BITS - bits;
    let value = ((raw << shift) as i64) >> shift;
    value as f64 / half_scale(bits)
}

fn unsigned_to_float(bits: u32, raw: u64) -> f64 {
    raw as f64 / half_scale(bits) - 1.0
}

fn float_to_signed(bits: u32, value: f64) -> u64 {
    let half = half_scale(bits);
    if value < 0.0 {
        // Magnitude is truncated towards zero, then stored in two's complement.
        let magnitude = (-value * half) as u64;
        magnitude.wrapping_neg() & mask(bits)
    } else {
        ((value * half) as u64).min(mask(bits - 1))
    }
}

fn float_to_unsigned(bits: u32, value: f64) -> u64 {
    let full = 2f64.powi(bits as i32);
    (((value + 1.0) / 2.0 * full) as u64).min(mask(bits))
}
