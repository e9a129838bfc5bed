//! Domain errors for segmentation operations
//!
//! This module defines all possible errors that can occur during one
//! invocation of the pipeline. These are domain-level errors that abstract
//! away infrastructure details.

use thiserror::Error;

/// Errors that can occur while segmenting a source object
///
/// These errors represent pipeline-level failures and are independent of
/// infrastructure implementation details (e.g., no AWS SDK error types here).
/// Every variant collapses into the error-shaped `RunSummary` at the
/// top-level boundary; nothing here is retried within an invocation.
#[derive(Error, Debug)]
pub enum SegmentationError {
    /// The trigger notification carried no usable record
    #[error("S3 event contains no records")]
    MissingRecord,

    /// The object key could not be decoded
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// Retrieving the source object from the store failed
    #[error("Fetch failed: {0}")]
    FetchFailure(String),

    /// Reading or writing local scratch storage failed
    #[error("Scratch storage failure: {0}")]
    ScratchIo(String),

    /// The external segmentation tool reported an error
    ///
    /// The `FFmpeg Error:` prefix is part of the reported message contract
    /// and must be preserved as-is in the result summary.
    #[error("FFmpeg Error: {0}")]
    FfmpegFailure(String),

    /// Uploading a chunk to the destination store failed
    #[error("Chunk upload failed: {0}")]
    PublishFailure(String),
}

impl SegmentationError {
    /// Create an invalid key error with a message
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    /// Create a fetch failure error with a message
    pub fn fetch_failure(msg: impl Into<String>) -> Self {
        Self::FetchFailure(msg.into())
    }

    /// Create a scratch I/O error with a message
    pub fn scratch_io(msg: impl Into<String>) -> Self {
        Self::ScratchIo(msg.into())
    }

    /// Create an ffmpeg failure error with a message
    pub fn ffmpeg_failure(msg: impl Into<String>) -> Self {
        Self::FfmpegFailure(msg.into())
    }

    /// Create a publish failure error with a message
    pub fn publish_failure(msg: impl Into<String>) -> Self {
        Self::PublishFailure(msg.into())
    }
}

/// Result type alias for segmentation operations
pub type Result<T> = std::result::Result<T, SegmentationError>;
