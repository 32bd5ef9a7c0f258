//! Bundle chunk blobs into a single in-memory zip archive.

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ChopError, Result};
use crate::wav::WavBlob;

/// Build one zip archive containing every blob, in order, by name.
///
/// The blobs themselves are untouched — an archive failure leaves them
/// individually usable.
///
/// # Errors
/// Returns `ChopError::Archive` if the blob list is empty or the zip writer
/// fails.
pub fn build_zip(blobs: &[WavBlob]) -> Result<Vec<u8>> {
    if blobs.is_empty() {
        return Err(ChopError::Archive("no blobs to archive".into()));
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions<()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    for blob in blobs {
        writer
            .start_file(blob.name.as_str(), options)
            .map_err(|e| ChopError::Archive(format!("entry '{}': {e}", blob.name)))?;
        writer
            .write_all(&blob.bytes)
            .map_err(|e| ChopError::Archive(format!("entry '{}': {e}", blob.name)))?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| ChopError::Archive(e.to_string()))?;

    let bytes = cursor.into_inner();
    debug!(entries = blobs.len(), bytes = bytes.len(), "zip built");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn blob(name: &str, payload: &[u8]) -> WavBlob {
        WavBlob::new(name, payload.to_vec())
    }

    #[test]
    fn archive_contains_all_entries_in_order() {
        let blobs = vec![
            blob("chunk 001.wav", b"first"),
            blob("chunk 002.wav", b"second"),
        ];
        let bytes = build_zip(&blobs).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["chunk 001.wav", "chunk 002.wav"]);

        let mut payload = Vec::new();
        archive
            .by_name("chunk 002.wav")
            .unwrap()
            .read_to_end(&mut payload)
            .unwrap();
        assert_eq!(payload, b"second");
    }

    #[test]
    fn empty_blob_list_is_an_archive_error() {
        assert!(matches!(build_zip(&[]), Err(ChopError::Archive(_))));
    }

    #[test]
    fn source_blobs_survive_archiving() {
        let blobs = vec![blob("chunk 001.wav", b"payload")];
        let _ = build_zip(&blobs).unwrap();
        assert_eq!(blobs[0].bytes, b"payload");
    }
}
