use anyhow::Context as _;

use crate::encode::encoder::{EncodedChunk, RAW_RGBA_MEDIA_TYPE};
use crate::encode::ffmpeg::WEBM_MEDIA_TYPE;
use crate::foundation::error::RavenResult;
use std::path::Path;

/// Base name offered for downloaded recordings.
pub const DEFAULT_ARTIFACT_STEM: &str = "raven-transition";

/// Immutable result of one recording: every encoded chunk concatenated in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaArtifact {
    media_type: String,
    bytes: Vec<u8>,
    chunk_count: usize,
}

impl MediaArtifact {
    /// Concatenate `chunks` in order into one artifact.
    pub fn from_chunks(media_type: impl Into<String>, chunks: &[EncodedChunk]) -> Self {
        let total = chunks.iter().map(|c| c.bytes.len()).sum();
        let mut bytes = Vec::with_capacity(total);
        for c in chunks {
            bytes.extend_from_slice(&c.bytes);
        }
        Self {
            media_type: media_type.into(),
            bytes,
            chunk_count: chunks.len(),
        }
    }

    /// Media type of the concatenated bytes.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the artifact and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of chunks the artifact was assembled from.
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Byte length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Return `true` when no bytes were produced.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// File name offered for download, with an extension matching the media type.
    pub fn suggested_file_name(&self) -> String {
        let ext = match self.media_type.as_str() {
            WEBM_MEDIA_TYPE => "webm",
            RAW_RGBA_MEDIA_TYPE => "rgba",
            _ => "bin",
        };
        format!("{DEFAULT_ARTIFACT_STEM}.{ext}")
    }

    /// Write the bytes to `path`, creating parent directories as needed.
    pub fn write_to(&self, path: impl AsRef<Path>) -> RavenResult<()> {
        let path = path.as_ref();
        ensure_parent_dir(path)?;
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("write artifact '{}'", path.display()))?;
        Ok(())
    }
}

/// Ensure the parent directory of `path` exists.
pub(crate) fn ensure_parent_dir(path: &Path) -> RavenResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/artifact.rs"]
mod tests;
