//! Infrastructure adapters backed by AWS S3

mod s3_store;

pub use s3_store::S3ObjectStore;
