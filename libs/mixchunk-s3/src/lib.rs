//! # MixChunk S3 Adapter
//!
//! AWS S3 implementation of the domain's `ObjectStore` port. Source objects
//! are fetched in a single attempt and collected into memory; chunk uploads
//! stream from disk.

pub mod infrastructure;

pub use infrastructure::S3ObjectStore;
