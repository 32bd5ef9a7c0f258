//! Audio decoding via symphonia.
//!
//! Thin adapter over the symphonia probe/decode machinery: arbitrary
//! container bytes (MP3, AAC, FLAC, OGG, WAV, MP4) in, one planar f32
//! [`AudioBuffer`] out. Codec internals are symphonia's problem; this module
//! only owns track selection, the packet loop, sample-format normalization,
//! and cooperative cancellation.
//!
//! Decoding is the one pipeline stage that can take real wall-clock time on
//! large files, so the packet loop checks a [`CancelToken`] between packets
//! and bails with `ChopError::Cancelled`.

use std::io::Cursor;

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::IntoSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use tracing::{debug, warn};

use crate::audio::AudioBuffer;
use crate::error::{ChopError, Result};
use crate::pipeline::CancelToken;

/// Decode a complete in-memory audio file into planar f32 PCM.
///
/// `extension_hint` (e.g. `"mp3"`) helps the probe pick a format reader but
/// is not trusted — symphonia still sniffs the container.
///
/// # Errors
/// - `ChopError::Decode` when the bytes are not a recognized audio container,
///   the stream has no audio track, or no frames could be decoded at all.
/// - `ChopError::Cancelled` when `cancel` fires mid-decode.
///
/// Malformed packets inside an otherwise-valid stream are skipped with a
/// warning, per symphonia's recoverable-error contract.
pub fn decode_bytes(
    bytes: Vec<u8>,
    extension_hint: Option<&str>,
    cancel: &CancelToken,
) -> Result<AudioBuffer> {
    if bytes.is_empty() {
        return Err(ChopError::Decode("input is empty".into()));
    }

    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension_hint {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ChopError::Decode(format!("unrecognized audio format: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ChopError::Decode("no audio track found".into()))?;

    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| ChopError::Decode(format!("failed to create decoder: {e}")))?;

    let mut sink = PlanarSink::default();

    loop {
        if cancel.is_cancelled() {
            debug!("decode cancelled");
            return Err(ChopError::Cancelled);
        }

        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                warn!("stopping at unreadable packet: {e}");
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => sink.append(&decoded)?,
            Err(SymphoniaError::DecodeError(e)) => {
                // Recoverable per symphonia's contract — skip the packet.
                warn!("skipping malformed packet: {e}");
            }
            Err(e) => {
                return Err(ChopError::Decode(format!("decode failed: {e}")));
            }
        }
    }

    let buffer = sink.into_buffer()?;
    debug!(
        frames = buffer.frame_count(),
        channels = buffer.channel_count(),
        sample_rate = buffer.sample_rate(),
        "decode complete"
    );
    Ok(buffer)
}

/// Planar accumulator for decoded packets.
///
/// Rate and channel layout are taken from the first decoded packet rather
/// than the codec parameters — some containers omit them until then. Any
/// mid-stream change of either is rejected: a chunk sequence with a shifting
/// rate or layout would be silently wrong.
#[derive(Default)]
struct PlanarSink {
    sample_rate: Option<u32>,
    channels: Vec<Vec<f32>>,
}

impl PlanarSink {
    fn append(&mut self, decoded: &AudioBufferRef<'_>) -> Result<()> {
        let spec = decoded.spec();
        let rate = spec.rate;
        let channel_count = spec.channels.count();

        match self.sample_rate {
            None => {
                self.sample_rate = Some(rate);
                self.channels = vec![Vec::new(); channel_count];
                debug!(rate, channel_count, "decoded stream parameters");
            }
            Some(expected) if expected != rate => {
                return Err(ChopError::Decode(format!(
                    "sample rate changed mid-stream: {expected} then {rate}"
                )));
            }
            Some(_) => {}
        }

        if self.channels.len() != channel_count {
            return Err(ChopError::Decode(format!(
                "channel count changed mid-stream: {} then {channel_count}",
                self.channels.len()
            )));
        }

        append_planar(decoded, &mut self.channels);
        Ok(())
    }

    fn into_buffer(self) -> Result<AudioBuffer> {
        let sample_rate = self
            .sample_rate
            .ok_or_else(|| ChopError::Decode("stream contained no decodable audio".into()))?;

        let buffer = AudioBuffer::from_planar(self.channels, sample_rate)?;
        if buffer.is_empty() {
            return Err(ChopError::Decode("stream decoded to zero frames".into()));
        }
        Ok(buffer)
    }
}

/// Append one decoded packet's samples to the planar accumulators,
/// converting from whatever sample format the codec produced.
fn append_planar(decoded: &AudioBufferRef<'_>, channels: &mut [Vec<f32>]) {
    match decoded {
        AudioBufferRef::U8(buf) => append_typed(buf, channels),
        AudioBufferRef::U16(buf) => append_typed(buf, channels),
        AudioBufferRef::U24(buf) => append_typed(buf, channels),
        AudioBufferRef::U32(buf) => append_typed(buf, channels),
        AudioBufferRef::S8(buf) => append_typed(buf, channels),
        AudioBufferRef::S16(buf) => append_typed(buf, channels),
        AudioBufferRef::S24(buf) => append_typed(buf, channels),
        AudioBufferRef::S32(buf) => append_typed(buf, channels),
        AudioBufferRef::F32(buf) => append_typed(buf, channels),
        AudioBufferRef::F64(buf) => append_typed(buf, channels),
    }
}

fn append_typed<S>(buf: &symphonia::core::audio::AudioBuffer<S>, channels: &mut [Vec<f32>])
where
    S: Sample + IntoSample<f32>,
{
    for (ch, out) in channels.iter_mut().enumerate() {
        out.extend(buf.chan(ch).iter().map(|s| (*s).into_sample()));
    }
}
