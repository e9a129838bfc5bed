//! Defines the _trigger_, the input for one handler invocation. The trigger
//! is built from the S3 event notification that announced the source object.

use aws_lambda_events::event::s3::S3Event;
use mixchunk_domain::SegmentationError;

/// Extract the raw (still URL-encoded) object key from an S3 event
///
/// Exactly one notification record is considered per invocation; only the
/// first is processed. An event without records, or whose first record
/// carries no key, is rejected with an explicit `MissingRecord` error rather
/// than an index panic.
pub fn object_key(event: &S3Event) -> Result<String, SegmentationError> {
    let record = event
        .records
        .first()
        .ok_or(SegmentationError::MissingRecord)?;

    record
        .s3
        .object
        .key
        .clone()
        .ok_or(SegmentationError::MissingRecord)
}
