//! Segmentation domain module
//!
//! This module contains the core orchestration logic and entities for audio
//! segmentation. It defines how a source object flows through the pipeline:
//! fetch to scratch storage, split into fixed-duration chunks, publish.

pub mod entity;
pub mod error;
pub mod service;

pub use entity::{ChunkRecord, RunSummary, SourceAudio};
pub use error::{Result, SegmentationError};
pub use service::{SegmentationConfig, SegmentationService};
