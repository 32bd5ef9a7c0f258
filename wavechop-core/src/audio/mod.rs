//! Decoded PCM audio, stored planar (one `Vec<f32>` per channel).
//!
//! # Invariants
//!
//! - At least one channel.
//! - Every channel has identical length (`frame_count`).
//! - Samples are nominally in [-1.0, 1.0]; out-of-range values are tolerated
//!   here and clamped at encode time.
//!
//! An `AudioBuffer` is never mutated after construction. The chunker takes
//! read-only sub-range copies, so one decoded buffer can feed any number of
//! chunking passes (or parallel ones) without coordination.

use crate::error::{ChopError, Result};

/// A multi-channel block of normalized f32 PCM at a known sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Build a buffer from planar channel data.
    ///
    /// # Errors
    /// Returns `ChopError::InvalidBuffer` when `sample_rate` is zero, the
    /// channel list is empty, or channel lengths disagree.
    pub fn from_planar(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(ChopError::InvalidBuffer("sample rate must be > 0".into()));
        }
        if channels.is_empty() {
            return Err(ChopError::InvalidBuffer(
                "at least one channel is required".into(),
            ));
        }
        let frame_count = channels[0].len();
        if let Some((idx, ch)) = channels
            .iter()
            .enumerate()
            .find(|(_, ch)| ch.len() != frame_count)
        {
            return Err(ChopError::InvalidBuffer(format!(
                "channel {idx} has {} frames, expected {frame_count}",
                ch.len()
            )));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Convenience constructor for single-channel audio.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::from_planar(vec![samples], sample_rate)
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels (≥ 1).
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel.
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    /// Planar sample data, one slice per channel.
    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    /// Sample data for one channel.
    ///
    /// # Panics
    /// Panics if `index >= channel_count()`.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    /// Duration of the buffer in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Returns true if the buffer holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_planar_accepts_matched_channels() {
        let buf = AudioBuffer::from_planar(vec![vec![0.0; 10], vec![0.0; 10]], 44_100).unwrap();
        assert_eq!(buf.channel_count(), 2);
        assert_eq!(buf.frame_count(), 10);
        assert_eq!(buf.sample_rate(), 44_100);
    }

    #[test]
    fn from_planar_rejects_mismatched_channels() {
        let err = AudioBuffer::from_planar(vec![vec![0.0; 10], vec![0.0; 9]], 44_100);
        assert!(matches!(err, Err(ChopError::InvalidBuffer(_))));
    }

    #[test]
    fn from_planar_rejects_zero_channels() {
        let err = AudioBuffer::from_planar(vec![], 44_100);
        assert!(matches!(err, Err(ChopError::InvalidBuffer(_))));
    }

    #[test]
    fn from_planar_rejects_zero_sample_rate() {
        let err = AudioBuffer::from_planar(vec![vec![0.0; 10]], 0);
        assert!(matches!(err, Err(ChopError::InvalidBuffer(_))));
    }

    #[test]
    fn zero_frame_buffer_is_valid_and_empty() {
        let buf = AudioBuffer::mono(vec![], 16_000).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.frame_count(), 0);
    }

    #[test]
    fn duration_is_frames_over_rate() {
        let buf = AudioBuffer::mono(vec![0.0; 8_000], 16_000).unwrap();
        assert!((buf.duration_secs() - 0.5).abs() < 1e-9);
    }
}
