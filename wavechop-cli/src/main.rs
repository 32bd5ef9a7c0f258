//! `wavechop` — chop an audio file into fixed-duration WAV chunks.
//!
//! ```text
//! wavechop input.mp3                          # chunk NNN.wav files into ./
//! wavechop input.mp3 --chunk-secs 4 -o out/   # 4 s chunks into out/
//! wavechop input.mp3 --zip chunks.zip         # one zip instead of loose files
//! ```
//!
//! Ctrl-C during a long decode cancels the run cleanly.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use wavechop_core::{CancelToken, ChopConfig, ChopEvent, Chopper};

#[derive(Parser, Debug)]
#[command(name = "wavechop")]
#[command(about = "Chop an audio file into fixed-duration WAV chunks")]
#[command(version)]
struct Args {
    /// Input audio file (MP3, AAC, FLAC, OGG, WAV, MP4)
    input: PathBuf,

    /// Chunk length in seconds
    #[arg(short = 's', long, default_value = "8.0")]
    chunk_secs: f64,

    /// File-name prefix for produced chunks
    #[arg(short, long, default_value = "chunk")]
    prefix: String,

    /// Directory to write chunk files into
    #[arg(short, long, default_value = ".", conflicts_with = "zip")]
    out_dir: PathBuf,

    /// Write a single zip archive to this path instead of loose files
    #[arg(short, long)]
    zip: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wavechop=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_owned);

    let chopper = Chopper::new(ChopConfig {
        chunk_duration_secs: args.chunk_secs,
        name_prefix: args.prefix.clone(),
    })?;

    // Ctrl-C cancels the decode stage cooperatively.
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, cancelling");
                cancel.cancel();
            }
        });
    }

    // Log progress as chunks become ready.
    let mut progress = chopper.subscribe_progress();
    tokio::spawn(async move {
        while let Ok(event) = progress.recv().await {
            if let ChopEvent::ChunkReady {
                index,
                total_chunks,
                name,
                ..
            } = event
            {
                info!("chunk {}/{total_chunks}: {name}", index + 1);
            }
        }
    });

    if let Some(zip_path) = &args.zip {
        let archive = chopper
            .chop_to_zip_async(bytes, extension, cancel)
            .await?;
        std::fs::write(zip_path, &archive)
            .with_context(|| format!("failed to write {}", zip_path.display()))?;
        info!("wrote {} ({} bytes)", zip_path.display(), archive.len());
    } else {
        let blobs = chopper.chop_bytes_async(bytes, extension, cancel).await?;
        std::fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("failed to create {}", args.out_dir.display()))?;
        for blob in &blobs {
            let path = args.out_dir.join(&blob.name);
            std::fs::write(&path, &blob.bytes)
                .with_context(|| format!("failed to write {}", path.display()))?;
        }
        info!("wrote {} chunks to {}", blobs.len(), args.out_dir.display());
    }

    Ok(())
}
