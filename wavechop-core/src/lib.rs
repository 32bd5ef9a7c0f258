//! # wavechop-core
//!
//! Reusable audio chop-and-export engine.
//!
//! ## Architecture
//!
//! ```text
//! file bytes → Decoder (symphonia) → AudioBuffer (planar f32 PCM)
//!                                         │
//!                                     Chunker (fixed-duration slices)
//!                                         │
//!                                    WavEncoder (16-bit PCM, 44-byte header)
//!                                         │
//!                              Vec<WavBlob> ──► Archiver (one zip, optional)
//! ```
//!
//! The pipeline is synchronous and pure: one decoded buffer in, N named WAV
//! blobs out. Nothing is written to disk; callers decide whether blobs are
//! saved, zipped, or forwarded elsewhere. An async wrapper runs the whole
//! thing under `spawn_blocking` and publishes progress on a broadcast channel.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod archive;
pub mod audio;
pub mod chop;
pub mod decode;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod wav;

// Convenience re-exports for downstream crates
pub use audio::AudioBuffer;
pub use chop::{chunk_count, chunks, Chunk};
pub use error::ChopError;
pub use events::ChopEvent;
pub use pipeline::{CancelToken, ChopConfig, Chopper};
pub use wav::{encode_wav, WavBlob};
