//! Ports (trait definitions) for external dependencies
//!
//! This module defines the contracts (ports) that external adapters must
//! implement. Following hexagonal architecture, the domain defines what it
//! needs, and the infrastructure provides implementations.
//!
//! ## Static Dispatch
//!
//! We use native Rust async traits with `impl Future` return types instead of
//! `async_trait` to ensure zero-cost abstractions and static dispatch.

use std::future::Future;
use std::path::Path;

use crate::segmentation::error::SegmentationError;

/// Port for object storage operations
///
/// This trait abstracts away the storage backend (S3, filesystem, in-memory
/// test doubles). Implementations must handle:
/// - Fetching a whole object into memory (single attempt, no retry)
/// - Publishing a local file under a destination key, streamed from disk
/// - Converting infrastructure errors to domain errors
pub trait ObjectStore: Send + Sync {
    /// Retrieve the full content of an object
    ///
    /// # Errors
    ///
    /// Returns `SegmentationError::FetchFailure` if the object is missing,
    /// inaccessible, or the body cannot be read. Exactly one attempt is made.
    fn fetch(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, SegmentationError>> + Send;

    /// Upload a local file under the given key
    ///
    /// Implementations stream the file from disk rather than buffering it
    /// fully in memory.
    ///
    /// # Errors
    ///
    /// Returns `SegmentationError::PublishFailure` if the upload fails.
    fn publish_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> impl Future<Output = Result<(), SegmentationError>> + Send;
}

/// Port for the external segmentation tool
///
/// One blocking (awaited) call per invocation: the future resolves only once
/// the tool has reported completion or failure. The tool writes sequentially
/// numbered output files matching `output_pattern` into the scratch area;
/// no chunk count is returned, discovery is the caller's concern.
pub trait AudioSplitter: Send + Sync {
    /// Split `input` into fixed-duration chunks
    ///
    /// `output_pattern` contains a `%03d` placeholder for the chunk index.
    /// Boundary behavior (short final chunk, sources shorter than one chunk,
    /// trailing zero-length chunk on exact multiples) is the tool's contract
    /// and is not re-derived by callers.
    ///
    /// # Errors
    ///
    /// Returns `SegmentationError::FfmpegFailure` carrying the tool's error
    /// message if the subprocess cannot be spawned or exits with failure.
    fn split(
        &self,
        input: &Path,
        output_pattern: &Path,
        segment_seconds: u32,
    ) -> impl Future<Output = Result<(), SegmentationError>> + Send;
}
