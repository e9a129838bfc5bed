//! # MixChunk Domain Layer
//!
//! This crate contains the orchestration logic for the MixChunk audio
//! segmentation pipeline. It follows hexagonal architecture principles:
//!
//! - **Entities**: Core domain models (SourceAudio, ChunkRecord, RunSummary)
//! - **Ports**: Trait definitions for external dependencies (ObjectStore, AudioSplitter)
//! - **Services**: Pipeline orchestration (fetch, split, publish)
//!
//! ## Architecture
//!
//! This layer has NO dependencies on infrastructure concerns (AWS, S3, ffmpeg
//! binaries, etc.). All external dependencies are expressed as traits (ports)
//! that are implemented by adapter layers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use mixchunk_domain::{AudioSplitter, ObjectStore, SegmentationService};
//!
//! // The service is generic over any ObjectStore / AudioSplitter implementation
//! async fn example<S: ObjectStore, F: AudioSplitter>(service: SegmentationService<S, F>) {
//!     let summary = service.run("uploads/track.m4a").await;
//!     println!("{:?}", summary);
//! }
//! ```

pub mod ports;
pub mod segmentation;

// Re-export commonly used types
pub use ports::{AudioSplitter, ObjectStore};
pub use segmentation::{
    ChunkRecord, RunSummary, SegmentationConfig, SegmentationError, SegmentationService,
    SourceAudio,
};
