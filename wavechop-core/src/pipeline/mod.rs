//! `Chopper` — the decode → chunk → encode pipeline.
//!
//! ## Stages (per run)
//!
//! ```text
//! 1. Decode source bytes → AudioBuffer            (ChopError::Decode aborts)
//! 2. Re-check cancellation before chunking
//! 3. Slice into fixed-duration chunks (lazy)
//! 4. Encode each chunk → named WavBlob            (failure aborts the set,
//!                                                  reporting the chunk index)
//! 5. Optionally bundle all blobs into one zip
//! ```
//!
//! A run is synchronous and owns its inputs exclusively; nothing is shared
//! between runs except atomic diagnostics counters, so one `Chopper` can
//! serve concurrent runs over independent files. The async wrappers move the
//! blocking work onto `spawn_blocking`, keeping the caller's executor free.
//!
//! Decode errors abort the whole file — a run never yields a partial chunk
//! set, and an encode failure names the chunk index instead of silently
//! dropping it.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use tokio::sync::broadcast;
use tracing::info;

use crate::archive::build_zip;
use crate::chop::{chunk_count, chunks};
use crate::decode::decode_bytes;
use crate::error::{ChopError, Result};
use crate::events::ChopEvent;
use crate::wav::{encode_wav, WavBlob};

/// Broadcast channel capacity: enough to buffer progress for slow consumers.
const PROGRESS_CAP: usize = 256;

/// Cooperative cancellation flag shared between a caller and a running chop.
///
/// Cloning shares the flag; once cancelled it stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The decode loop observes this between packets.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Configuration for a [`Chopper`].
#[derive(Debug, Clone)]
pub struct ChopConfig {
    /// Target chunk length in seconds. Default: 8.0.
    pub chunk_duration_secs: f64,
    /// File-name prefix for produced blobs. Default: `"chunk"`.
    pub name_prefix: String,
}

impl Default for ChopConfig {
    fn default() -> Self {
        Self {
            chunk_duration_secs: 8.0,
            name_prefix: "chunk".to_string(),
        }
    }
}

impl ChopConfig {
    /// # Errors
    /// Returns `ChopError::InvalidConfig` for a non-positive or non-finite
    /// chunk duration.
    pub fn validate(&self) -> Result<()> {
        if !self.chunk_duration_secs.is_finite() || self.chunk_duration_secs <= 0.0 {
            return Err(ChopError::InvalidConfig(format!(
                "chunk duration must be positive, got {}",
                self.chunk_duration_secs
            )));
        }
        Ok(())
    }
}

/// Shared pipeline counters, readable while runs are in flight.
#[derive(Debug, Default)]
pub struct ChopDiagnostics {
    pub frames_decoded: AtomicUsize,
    pub chunks_emitted: AtomicUsize,
    pub bytes_encoded: AtomicUsize,
    pub encode_errors: AtomicUsize,
    pub archives_built: AtomicUsize,
}

impl ChopDiagnostics {
    pub fn reset(&self) {
        self.frames_decoded.store(0, Ordering::Relaxed);
        self.chunks_emitted.store(0, Ordering::Relaxed);
        self.bytes_encoded.store(0, Ordering::Relaxed);
        self.encode_errors.store(0, Ordering::Relaxed);
        self.archives_built.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            chunks_emitted: self.chunks_emitted.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            archives_built: self.archives_built.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DiagnosticsSnapshot {
    pub frames_decoded: usize,
    pub chunks_emitted: usize,
    pub bytes_encoded: usize,
    pub encode_errors: usize,
    pub archives_built: usize,
}

/// File name for chunk `index`: zero-based internally, one-based and
/// zero-padded in the name — `chunk_file_name("chunk", 0)` is `"chunk 001.wav"`.
pub fn chunk_file_name(prefix: &str, index: usize) -> String {
    format!("{prefix} {:03}.wav", index + 1)
}

/// The chop pipeline engine.
///
/// `Chopper` is `Send + Sync` and cheap to clone — clones share diagnostics
/// and the progress channel.
#[derive(Clone)]
pub struct Chopper {
    config: ChopConfig,
    diagnostics: Arc<ChopDiagnostics>,
    progress_tx: broadcast::Sender<ChopEvent>,
}

impl Chopper {
    /// # Errors
    /// Returns `ChopError::InvalidConfig` when the config fails validation.
    pub fn new(config: ChopConfig) -> Result<Self> {
        config.validate()?;
        let (progress_tx, _) = broadcast::channel(PROGRESS_CAP);
        Ok(Self {
            config,
            diagnostics: Arc::new(ChopDiagnostics::default()),
            progress_tx,
        })
    }

    pub fn config(&self) -> &ChopConfig {
        &self.config
    }

    /// Subscribe to progress events for all runs on this chopper.
    pub fn subscribe_progress(&self) -> broadcast::Receiver<ChopEvent> {
        self.progress_tx.subscribe()
    }

    pub fn diagnostics_snapshot(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    /// Shared counters. Counters accumulate across runs; callers starting a
    /// fresh batch call `reset()` here.
    pub fn diagnostics(&self) -> &ChopDiagnostics {
        &self.diagnostics
    }

    /// Run the full pipeline on one in-memory source file.
    ///
    /// Returns one named WAV blob per chunk, in order.
    ///
    /// # Errors
    /// - `ChopError::Decode` — unrecognized/corrupt source; no blobs produced.
    /// - `ChopError::Cancelled` — `cancel` fired during decode or before
    ///   chunking.
    /// - `ChopError::Encode` — a chunk failed to serialize; the message names
    ///   the failing index and the whole set is discarded.
    pub fn chop_bytes(
        &self,
        bytes: Vec<u8>,
        extension_hint: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Vec<WavBlob>> {
        let source = decode_bytes(bytes, extension_hint, cancel)?;
        self.diagnostics
            .frames_decoded
            .fetch_add(source.frame_count(), Ordering::Relaxed);

        // Cancellation is honoured up to the point chunking starts; after
        // that the remaining work is fast and runs to completion.
        if cancel.is_cancelled() {
            return Err(ChopError::Cancelled);
        }

        let duration = self.config.chunk_duration_secs;
        let total_chunks = chunk_count(&source, duration);
        if total_chunks == 0 {
            return Err(ChopError::InvalidConfig(format!(
                "chunk duration {duration}s is shorter than one frame at {} Hz",
                source.sample_rate()
            )));
        }

        info!(
            frames = source.frame_count(),
            sample_rate = source.sample_rate(),
            channels = source.channel_count(),
            total_chunks,
            "source decoded"
        );
        let _ = self.progress_tx.send(ChopEvent::Decoded {
            frame_count: source.frame_count(),
            sample_rate: source.sample_rate(),
            channel_count: source.channel_count(),
            total_chunks,
        });

        let mut blobs = Vec::with_capacity(total_chunks);

        for chunk in chunks(&source, duration) {
            let encoded = encode_wav(&chunk.buffer).map_err(|e| {
                self.diagnostics
                    .encode_errors
                    .fetch_add(1, Ordering::Relaxed);
                match e {
                    ChopError::Encode(msg) => {
                        ChopError::Encode(format!("chunk {}: {msg}", chunk.index))
                    }
                    other => other,
                }
            })?;

            self.diagnostics
                .chunks_emitted
                .fetch_add(1, Ordering::Relaxed);
            self.diagnostics
                .bytes_encoded
                .fetch_add(encoded.len(), Ordering::Relaxed);

            let name = chunk_file_name(&self.config.name_prefix, chunk.index);
            let _ = self.progress_tx.send(ChopEvent::ChunkReady {
                index: chunk.index,
                total_chunks,
                name: name.clone(),
                byte_len: encoded.len(),
            });

            blobs.push(WavBlob::new(name, encoded));
        }

        let _ = self.progress_tx.send(ChopEvent::Finished { total_chunks });
        info!(total_chunks, "chop run complete");

        Ok(blobs)
    }

    /// `chop_bytes` followed by zip bundling of the whole set.
    pub fn chop_to_zip(
        &self,
        bytes: Vec<u8>,
        extension_hint: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<Vec<u8>> {
        let blobs = self.chop_bytes(bytes, extension_hint, cancel)?;
        let archive = build_zip(&blobs)?;
        self.diagnostics
            .archives_built
            .fetch_add(1, Ordering::Relaxed);
        Ok(archive)
    }

    /// Async wrapper over [`chop_bytes`](Self::chop_bytes) via `spawn_blocking`.
    pub async fn chop_bytes_async(
        &self,
        bytes: Vec<u8>,
        extension_hint: Option<String>,
        cancel: CancelToken,
    ) -> Result<Vec<WavBlob>> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            this.chop_bytes(bytes, extension_hint.as_deref(), &cancel)
        })
        .await
        .map_err(|e| ChopError::Other(anyhow::anyhow!("chop task panicked: {e}")))?
    }

    /// Async wrapper over [`chop_to_zip`](Self::chop_to_zip) via `spawn_blocking`.
    pub async fn chop_to_zip_async(
        &self,
        bytes: Vec<u8>,
        extension_hint: Option<String>,
        cancel: CancelToken,
    ) -> Result<Vec<u8>> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            this.chop_to_zip(bytes, extension_hint.as_deref(), &cancel)
        })
        .await
        .map_err(|e| ChopError::Other(anyhow::anyhow!("chop task panicked: {e}")))?
    }
}

impl std::fmt::Debug for Chopper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chopper")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
