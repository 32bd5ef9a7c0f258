//! Fixed-duration chunking of a decoded buffer.
//!
//! ## Algorithm
//!
//! For chunk index `i` starting at 0:
//!
//! ```text
//! start = i * frames_per_chunk
//! end   = min(start + frames_per_chunk, frame_count)
//! ```
//!
//! Iteration stops once `start >= frame_count`, so a zero-frame source yields
//! nothing and a zero-frame chunk is never emitted. Each chunk is a verbatim
//! per-channel copy of `[start, end)` — no resampling, no fades, no padding of
//! the short final chunk. The iterator is a pure function of its inputs and
//! can be restarted or run concurrently against the same source.

use crate::audio::AudioBuffer;

/// One fixed-duration slice of a source buffer.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Zero-based position in the chunk sequence.
    pub index: usize,
    /// First source frame covered by this chunk.
    pub start_frame: usize,
    /// The slice itself; inherits sample rate and channel count.
    pub buffer: AudioBuffer,
}

impl Chunk {
    /// Samples per channel in this chunk.
    pub fn frame_count(&self) -> usize {
        self.buffer.frame_count()
    }
}

/// Frames per full chunk for a given duration and rate.
///
/// Fractional durations truncate: `0.5 s` at 44.1 kHz is 22 050 frames.
pub fn frames_per_chunk(chunk_duration_secs: f64, sample_rate: u32) -> usize {
    (chunk_duration_secs * sample_rate as f64) as usize
}

/// Number of chunks `chunks()` will yield: `ceil(frame_count / frames_per_chunk)`.
pub fn chunk_count(source: &AudioBuffer, chunk_duration_secs: f64) -> usize {
    let per_chunk = frames_per_chunk(chunk_duration_secs, source.sample_rate());
    if per_chunk == 0 {
        return 0;
    }
    source.frame_count().div_ceil(per_chunk)
}

/// Lazily slice `source` into fixed-duration chunks.
///
/// The caller is expected to have validated `chunk_duration_secs > 0`
/// (see `ChopConfig::validate`); a duration that truncates to zero frames
/// yields an empty iterator rather than looping forever.
pub fn chunks(
    source: &AudioBuffer,
    chunk_duration_secs: f64,
) -> impl Iterator<Item = Chunk> + '_ {
    let per_chunk = frames_per_chunk(chunk_duration_secs, source.sample_rate());
    let total = if per_chunk == 0 {
        0
    } else {
        chunk_count(source, chunk_duration_secs)
    };

    (0..total).map(move |index| {
        let start_frame = index * per_chunk;
        let end_frame = (start_frame + per_chunk).min(source.frame_count());

        let channels: Vec<Vec<f32>> = source
            .channels()
            .iter()
            .map(|ch| ch[start_frame..end_frame].to_vec())
            .collect();

        // Sub-ranges of a valid buffer always satisfy the buffer invariants.
        let buffer = AudioBuffer::from_planar(channels, source.sample_rate())
            .expect("chunk slices inherit source buffer invariants");

        Chunk {
            index,
            start_frame,
            buffer,
        }
    })
}
