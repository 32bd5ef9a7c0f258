//! Canonical 16-bit PCM WAV serialization.
//!
//! Output layout is the fixed 44-byte RIFF/WAVE header (PCM format tag 1,
//! 16-byte `fmt ` chunk) followed by frame-major interleaved little-endian
//! i16 samples. The header is written by hand: general-purpose WAV writers
//! switch to WAVE_FORMAT_EXTENSIBLE above two channels, and downstream
//! consumers of these blobs require the plain-PCM 44-byte layout for any
//! channel count.
//!
//! The f32 → i16 sample conversion is likewise a compatibility contract:
//!
//! - clamp to [-1.0, 1.0]
//! - negative values scale by 32768, non-negative by 32767
//! - truncate toward zero (no rounding)
//!
//! Existing consumers compare output byte-for-byte, so the asymmetric scale
//! and the truncation must not be "fixed".

use tracing::debug;

use crate::audio::AudioBuffer;
use crate::error::{ChopError, Result};

/// Fixed RIFF/WAVE header size for 16-bit PCM.
pub const WAV_HEADER_LEN: usize = 44;

/// Bytes per sample (16-bit).
const BYTES_PER_SAMPLE: usize = 2;

/// An immutable, named WAV artifact.
///
/// Ownership transfers to the caller on creation; wavechop keeps no handle.
#[derive(Debug, Clone)]
pub struct WavBlob {
    /// Caller-facing identifier, e.g. `"chunk 001.wav"`.
    pub name: String,
    /// Complete WAV file bytes (header + data).
    pub bytes: Vec<u8>,
}

impl WavBlob {
    /// MIME type of every blob produced by this module.
    pub const MIME_TYPE: &'static str = "audio/wav";

    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Total size in bytes (header included).
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}

/// Convert one normalized sample to i16 under the compatibility contract.
///
/// `1.0 → 32767`, `-1.0 → -32768`, out-of-range input clamps first, and the
/// scaled value truncates toward zero.
#[inline]
pub fn sample_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    let scaled = if clamped < 0.0 {
        clamped * 32768.0
    } else {
        clamped * 32767.0
    };
    // `as` casts truncate toward zero, matching the reference output.
    scaled as i16
}

/// Serialize `buffer` into complete WAV file bytes.
///
/// Output length is exactly
/// `44 + frame_count * channel_count * 2`, for any channel count ≥ 1.
///
/// # Errors
/// Returns `ChopError::Encode` when the buffer holds zero frames, the
/// channel count does not fit a u16, or the data would overflow the u32
/// RIFF size fields. Zero frames indicates a pipeline bug — the chunker
/// never emits empty chunks.
pub fn encode_wav(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let frame_count = buffer.frame_count();
    let channel_count = buffer.channel_count();

    if frame_count == 0 {
        return Err(ChopError::Encode(
            "refusing to encode a zero-frame buffer".into(),
        ));
    }
    let channels_u16 = u16::try_from(channel_count)
        .map_err(|_| ChopError::Encode(format!("channel count {channel_count} exceeds u16")))?;

    let data_len = frame_count * channel_count * BYTES_PER_SAMPLE;
    let data_len_u32 = u32::try_from(data_len)
        .ok()
        .filter(|len| len.checked_add(36).is_some())
        .ok_or_else(|| {
            ChopError::Encode(format!("{data_len} data bytes overflow the RIFF size field"))
        })?;

    let sample_rate = buffer.sample_rate();
    let byte_rate = sample_rate * channels_u16 as u32 * BYTES_PER_SAMPLE as u32;
    let block_align = channels_u16 * BYTES_PER_SAMPLE as u16;

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + data_len);

    // RIFF header
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len_u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");

    // fmt chunk — always the 16-byte plain-PCM form
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM format tag
    bytes.extend_from_slice(&channels_u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&byte_rate.to_le_bytes());
    bytes.extend_from_slice(&block_align.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    // data chunk, frame-major interleave: one sample per channel per frame
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len_u32.to_le_bytes());
    for frame in 0..frame_count {
        for channel in buffer.channels() {
            bytes.extend_from_slice(&sample_to_i16(channel[frame]).to_le_bytes());
        }
    }

    debug!(
        frames = frame_count,
        channels = channel_count,
        bytes = bytes.len(),
        "encoded wav"
    );
    Ok(bytes)
}
