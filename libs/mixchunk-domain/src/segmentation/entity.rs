//! Domain entities for audio segmentation
//!
//! This module defines the core domain model for one pipeline invocation:
//! the source object being split, the per-chunk metadata records, and the
//! result summary that is the invocation's sole output.

use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};

use crate::segmentation::error::SegmentationError;

/// Extension expected on source objects and carried by every chunk
pub const AUDIO_EXT: &str = ".m4a";

/// A source audio object resolved from a trigger notification
///
/// S3 event notifications URL-encode object keys and encode spaces as `+`.
/// `SourceAudio` owns that decoding and derives every name the pipeline
/// needs from the key's final path segment:
///
/// - scratch file: `<base>.m4a`
/// - ffmpeg output pattern: `<base>_%03d.m4a`
/// - chunk filename prefix: `<base>_`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAudio {
    /// Decoded object key, used verbatim against the source bucket
    key: String,

    /// Final path segment with the audio extension stripped
    base_name: String,
}

impl SourceAudio {
    /// Resolve a source object from the raw, URL-encoded key of an S3 event
    ///
    /// Decodes `+` to space first, then applies percent-decoding. The base
    /// name strips a trailing `.m4a` when present and otherwise keeps the
    /// final path segment whole.
    ///
    /// # Errors
    ///
    /// Returns `SegmentationError::InvalidKey` if the decoded key is not
    /// valid UTF-8.
    pub fn from_encoded_key(raw: &str) -> Result<Self, SegmentationError> {
        let spaced = raw.replace('+', " ");
        let key = percent_decode_str(&spaced)
            .decode_utf8()
            .map_err(|err| SegmentationError::invalid_key(format!("'{}': {}", raw, err)))?
            .into_owned();

        let file_name = match key.rsplit_once('/') {
            Some((_, name)) => name,
            None => key.as_str(),
        };
        let base_name = file_name
            .strip_suffix(AUDIO_EXT)
            .unwrap_or(file_name)
            .to_string();

        Ok(Self { key, base_name })
    }

    /// Get the decoded object key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the derived base name
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Path of the scratch copy of the source object
    pub fn scratch_file(&self, scratch_dir: &Path) -> PathBuf {
        scratch_dir.join(format!("{}{}", self.base_name, AUDIO_EXT))
    }

    /// ffmpeg output pattern producing zero-padded, sequentially numbered chunks
    pub fn output_pattern(&self, scratch_dir: &Path) -> PathBuf {
        scratch_dir.join(format!("{}_%03d{}", self.base_name, AUDIO_EXT))
    }

    /// Filename prefix shared by every chunk this invocation produces
    ///
    /// The trailing underscore keeps the scratch copy itself (`<base>.m4a`)
    /// out of the chunk discovery scan.
    pub fn chunk_prefix(&self) -> String {
        format!("{}_", self.base_name)
    }
}

/// Metadata for one uploaded chunk
///
/// `size` is read from the local file's metadata before upload, not from the
/// upload response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkRecord {
    /// Destination key the chunk was uploaded under (e.g. `chunks/track_000.m4a`)
    pub chunk_key: String,

    /// Chunk size in bytes
    pub size: u64,
}

/// The sole externally observable output of an invocation
///
/// Serializes as `{"status": "success", "chunkDetails": [...]}` or
/// `{"status": "error", "error": "..."}`. Exactly one summary is produced
/// per invocation; every stage failure collapses into the error variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunSummary {
    /// All chunks were uploaded; metadata in upload order
    #[serde(rename_all = "camelCase")]
    Success { chunk_details: Vec<ChunkRecord> },

    /// Some stage failed; no chunk metadata is reported
    Error { error: String },
}

impl RunSummary {
    /// Build the success variant from uploaded chunk records
    pub fn success(chunk_details: Vec<ChunkRecord>) -> Self {
        Self::Success { chunk_details }
    }

    /// Check whether this summary reports success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<SegmentationError> for RunSummary {
    fn from(err: SegmentationError) -> Self {
        Self::Error {
            error: err.to_string(),
        }
    }
}
