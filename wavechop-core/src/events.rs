//! Progress events broadcast while a chop run executes.
//!
//! Serialized with camelCase fields and lowercase tags so front ends can
//! consume them as JSON without a translation layer.

use serde::{Deserialize, Serialize};

/// Emitted by [`Chopper`](crate::pipeline::Chopper) as a run progresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChopEvent {
    /// The source file decoded successfully; chunking is about to start.
    #[serde(rename_all = "camelCase")]
    Decoded {
        frame_count: usize,
        sample_rate: u32,
        channel_count: usize,
        /// Chunks the run will produce.
        total_chunks: usize,
    },
    /// One chunk has been encoded to a WAV blob.
    #[serde(rename_all = "camelCase")]
    ChunkReady {
        /// Zero-based chunk index.
        index: usize,
        total_chunks: usize,
        /// Blob file name, e.g. `"chunk 003.wav"`.
        name: String,
        byte_len: usize,
    },
    /// The run completed; all blobs were produced.
    #[serde(rename_all = "camelCase")]
    Finished { total_chunks: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_ready_serializes_with_camel_case_and_lowercase_tag() {
        let event = ChopEvent::ChunkReady {
            index: 2,
            total_chunks: 5,
            name: "chunk 003.wav".into(),
            byte_len: 705_644,
        };

        let json = serde_json::to_value(&event).expect("serialize chunk event");
        assert_eq!(json["kind"], "chunkready");
        assert_eq!(json["index"], 2);
        assert_eq!(json["totalChunks"], 5);
        assert_eq!(json["name"], "chunk 003.wav");
        assert_eq!(json["byteLen"], 705_644);

        let round_trip: ChopEvent = serde_json::from_value(json).expect("deserialize chunk event");
        assert!(matches!(round_trip, ChopEvent::ChunkReady { index: 2, .. }));
    }

    #[test]
    fn decoded_event_round_trips() {
        let event = ChopEvent::Decoded {
            frame_count: 500_000,
            sample_rate: 44_100,
            channel_count: 2,
            total_chunks: 2,
        };
        let json = serde_json::to_value(&event).expect("serialize decoded event");
        assert_eq!(json["kind"], "decoded");
        assert_eq!(json["frameCount"], 500_000);

        let round_trip: ChopEvent =
            serde_json::from_value(json).expect("deserialize decoded event");
        assert!(matches!(
            round_trip,
            ChopEvent::Decoded {
                total_chunks: 2,
                ..
            }
        ));
    }
}
