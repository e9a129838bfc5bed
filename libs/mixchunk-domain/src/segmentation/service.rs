//! Segmentation service - Pipeline orchestration
//!
//! This module contains the core orchestration for one invocation: fetch the
//! source object into scratch storage, split it with the external tool, then
//! publish every discovered chunk. The stages run strictly in sequence and
//! each returns a `Result`, so the "any stage fails, uniform error summary"
//! contract lives in exactly one place (`run`).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use super::{ChunkRecord, RunSummary, SegmentationError, SourceAudio};
use crate::ports::{AudioSplitter, ObjectStore};

/// Configuration for the segmentation service
///
/// Replaces the hardcoded values of the original deployment with an explicit
/// structure so tests can substitute buckets and scratch locations without
/// touching global state.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// Bucket the trigger notification refers to (default: `mixradio-obj-bucket`)
    pub source_bucket: String,
    /// Bucket chunks are published to (default: `mixradio-chunks-bucket`)
    pub chunks_bucket: String,
    /// Fixed chunk duration in seconds (default: 20)
    pub chunk_seconds: u32,
    /// Destination key prefix for uploaded chunks (default: `chunks/`)
    pub chunk_key_prefix: String,
    /// Content type attached to every chunk upload (default: `audio/m4a`)
    pub content_type: String,
    /// Scratch directory for the source copy and chunk files
    /// (default: the platform temporary directory)
    pub scratch_dir: PathBuf,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            source_bucket: "mixradio-obj-bucket".to_string(),
            chunks_bucket: "mixradio-chunks-bucket".to_string(),
            chunk_seconds: 20,
            chunk_key_prefix: "chunks/".to_string(),
            content_type: "audio/m4a".to_string(),
            scratch_dir: std::env::temp_dir(),
        }
    }
}

/// Service orchestrating one segmentation invocation
///
/// The service coordinates the `ObjectStore` and `AudioSplitter` ports:
/// - Resolves the source object from the raw event key
/// - Fetches the object and writes it to scratch storage
/// - Awaits the external split
/// - Discovers and publishes chunk files, collecting metadata
///
/// ## Static Dispatch
///
/// The service is generic over its port implementations. The compiler
/// monomorphizes each combination, so test doubles carry no runtime cost.
pub struct SegmentationService<S, F> {
    store: S,
    splitter: F,
    config: SegmentationConfig,
}

impl<S, F> SegmentationService<S, F>
where
    S: ObjectStore,
    F: AudioSplitter,
{
    /// Create a new service with the given ports and configuration
    pub fn new(store: S, splitter: F, config: SegmentationConfig) -> Self {
        Self {
            store,
            splitter,
            config,
        }
    }

    /// Create a new service with default configuration
    pub fn with_defaults(store: S, splitter: F) -> Self {
        Self::new(store, splitter, SegmentationConfig::default())
    }

    /// Get the service configuration
    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Get the object store port
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the splitter port
    pub fn splitter(&self) -> &F {
        &self.splitter
    }

    /// Run one invocation for the raw, URL-encoded object key
    ///
    /// This is the top-level boundary: whatever any stage returns, the caller
    /// always receives exactly one `RunSummary` and never a propagated error.
    pub async fn run(&self, raw_key: &str) -> RunSummary {
        match self.process(raw_key).await {
            Ok(chunks) => {
                info!(chunk_count = chunks.len(), "Invocation succeeded");
                RunSummary::success(chunks)
            }
            Err(err) => {
                error!(error = %err, "Processing failed");
                RunSummary::from(err)
            }
        }
    }

    /// Run the pipeline stages, propagating the first failure
    ///
    /// Exposed separately from `run` so callers and tests can observe which
    /// stage failed before the error collapses into the uniform summary.
    pub async fn process(&self, raw_key: &str) -> Result<Vec<ChunkRecord>, SegmentationError> {
        let source = SourceAudio::from_encoded_key(raw_key)?;
        info!(key = %source.key(), "Processing file");

        let scratch_file = self.fetch_to_scratch(&source).await?;
        self.split_into_chunks(&source, &scratch_file).await?;
        self.publish_chunks(&source).await
    }

    /// Fetch the source object and write it to scratch storage
    async fn fetch_to_scratch(
        &self,
        source: &SourceAudio,
    ) -> Result<PathBuf, SegmentationError> {
        let data = self
            .store
            .fetch(&self.config.source_bucket, source.key())
            .await?;

        let path = source.scratch_file(&self.config.scratch_dir);
        debug!(path = %path.display(), bytes = data.len(), "Writing source object to scratch");
        fs::write(&path, &data).map_err(|err| {
            SegmentationError::scratch_io(format!(
                "failed to write '{}': {}",
                path.display(),
                err
            ))
        })?;

        Ok(path)
    }

    /// Await the external tool splitting the scratch file into chunks
    async fn split_into_chunks(
        &self,
        source: &SourceAudio,
        scratch_file: &Path,
    ) -> Result<(), SegmentationError> {
        let pattern = source.output_pattern(&self.config.scratch_dir);
        self.splitter
            .split(scratch_file, &pattern, self.config.chunk_seconds)
            .await
    }

    /// Discover chunk files and upload each one, collecting metadata
    ///
    /// Chunk discovery is a directory scan for `<base>_` filenames; no count
    /// from the splitter is consulted. The first failing upload aborts the
    /// rest: earlier uploads stay committed in the destination bucket but are
    /// not reported, because the invocation result collapses to an error.
    async fn publish_chunks(
        &self,
        source: &SourceAudio,
    ) -> Result<Vec<ChunkRecord>, SegmentationError> {
        let names = self.discover_chunk_files(&source.chunk_prefix())?;
        let mut chunks = Vec::with_capacity(names.len());

        for name in names {
            let path = self.config.scratch_dir.join(&name);
            let chunk_key = format!("{}{}", self.config.chunk_key_prefix, name);

            self.store
                .publish_file(
                    &self.config.chunks_bucket,
                    &chunk_key,
                    &path,
                    &self.config.content_type,
                )
                .await?;

            let size = fs::metadata(&path)
                .map_err(|err| {
                    SegmentationError::scratch_io(format!(
                        "failed to stat '{}': {}",
                        path.display(),
                        err
                    ))
                })?
                .len();

            info!(chunk_key = %chunk_key, size, "Uploaded chunk");
            chunks.push(ChunkRecord { chunk_key, size });
        }

        Ok(chunks)
    }

    /// List scratch-dir filenames starting with the chunk prefix
    ///
    /// Sorted lexicographically: ffmpeg's zero-padded `%03d` indices make
    /// this numeric chunk order, so the summary does not depend on the
    /// platform's directory-listing order.
    fn discover_chunk_files(&self, prefix: &str) -> Result<Vec<String>, SegmentationError> {
        let entries = fs::read_dir(&self.config.scratch_dir).map_err(|err| {
            SegmentationError::scratch_io(format!(
                "failed to list '{}': {}",
                self.config.scratch_dir.display(),
                err
            ))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| {
                SegmentationError::scratch_io(format!("failed to read directory entry: {}", err))
            })?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name.starts_with(prefix) {
                names.push(name.to_string());
            }
        }
        names.sort();

        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // In-memory object store for testing. `fail_upload_at` forces a failure
    // on the nth publish call; `uploads` records keys in call order.
    struct InMemoryStore {
        objects: Mutex<HashMap<(String, String), Vec<u8>>>,
        uploads: Mutex<Vec<String>>,
        fail_upload_at: Option<usize>,
    }

    impl InMemoryStore {
        fn new() -> Self {
            Self {
                objects: Mutex::new(HashMap::new()),
                uploads: Mutex::new(Vec::new()),
                fail_upload_at: None,
            }
        }

        fn with_object(self, bucket: &str, key: &str, data: Vec<u8>) -> Self {
            self.objects
                .lock()
                .unwrap()
                .insert((bucket.to_string(), key.to_string()), data);
            self
        }

        fn failing_upload_at(mut self, index: usize) -> Self {
            self.fail_upload_at = Some(index);
            self
        }

        fn uploaded_keys(&self) -> Vec<String> {
            self.uploads.lock().unwrap().clone()
        }
    }

    impl ObjectStore for InMemoryStore {
        fn fetch(
            &self,
            bucket: &str,
            key: &str,
        ) -> impl std::future::Future<Output = Result<Vec<u8>, SegmentationError>> + Send {
            let result = self
                .objects
                .lock()
                .unwrap()
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| {
                    SegmentationError::fetch_failure(format!("no such key '{}'", key))
                });

            async move { result }
        }

        fn publish_file(
            &self,
            _bucket: &str,
            key: &str,
            path: &Path,
            _content_type: &str,
        ) -> impl std::future::Future<Output = Result<(), SegmentationError>> + Send {
            let mut uploads = self.uploads.lock().unwrap();
            let result = if self.fail_upload_at == Some(uploads.len()) {
                Err(SegmentationError::publish_failure(format!(
                    "upload of '{}' rejected",
                    key
                )))
            } else if !path.exists() {
                Err(SegmentationError::publish_failure(format!(
                    "local file '{}' missing",
                    path.display()
                )))
            } else {
                uploads.push(key.to_string());
                Ok(())
            };
            drop(uploads);

            async move { result }
        }
    }

    // Scripted splitter: writes the configured chunk files next to the
    // output pattern, or fails with the given message.
    struct ScriptedSplitter {
        chunks: Vec<(String, Vec<u8>)>,
        error: Option<String>,
        calls: AtomicUsize,
    }

    impl ScriptedSplitter {
        fn producing(chunks: Vec<(&str, Vec<u8>)>) -> Self {
            Self {
                chunks: chunks
                    .into_iter()
                    .map(|(name, data)| (name.to_string(), data))
                    .collect(),
                error: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                chunks: Vec::new(),
                error: Some(message.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl AudioSplitter for ScriptedSplitter {
        fn split(
            &self,
            input: &Path,
            output_pattern: &Path,
            _segment_seconds: u32,
        ) -> impl std::future::Future<Output = Result<(), SegmentationError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let result = if let Some(message) = &self.error {
                Err(SegmentationError::ffmpeg_failure(message.clone()))
            } else if !input.exists() {
                Err(SegmentationError::ffmpeg_failure(format!(
                    "no such input '{}'",
                    input.display()
                )))
            } else {
                let dir = output_pattern.parent().unwrap();
                for (name, data) in &self.chunks {
                    fs::write(dir.join(name), data).unwrap();
                }
                Ok(())
            };

            async move { result }
        }
    }

    fn config_in(dir: &Path) -> SegmentationConfig {
        SegmentationConfig {
            scratch_dir: dir.to_path_buf(),
            ..SegmentationConfig::default()
        }
    }

    #[tokio::test]
    async fn test_chunks_published_in_numeric_order_with_sizes() {
        let scratch = tempfile::tempdir().unwrap();
        let store = InMemoryStore::new().with_object(
            "mixradio-obj-bucket",
            "path/to/track.m4a",
            vec![0u8; 64],
        );
        let splitter = ScriptedSplitter::producing(vec![
            ("track_000.m4a", vec![1u8; 30]),
            ("track_001.m4a", vec![2u8; 25]),
            ("track_002.m4a", vec![3u8; 12]),
        ]);
        let service = SegmentationService::new(store, splitter, config_in(scratch.path()));

        let chunks = service.process("path/to/track.m4a").await.unwrap();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chunk_key, "chunks/track_000.m4a");
        assert_eq!(chunks[1].chunk_key, "chunks/track_001.m4a");
        assert_eq!(chunks[2].chunk_key, "chunks/track_002.m4a");
        assert_eq!(chunks[0].size, 30);
        assert_eq!(chunks[1].size, 25);
        assert_eq!(chunks[2].size, 12);
    }

    #[tokio::test]
    async fn test_scratch_file_holds_source_bytes() {
        let scratch = tempfile::tempdir().unwrap();
        let data = vec![7u8; 48];
        let store =
            InMemoryStore::new().with_object("mixradio-obj-bucket", "track.m4a", data.clone());
        let splitter = ScriptedSplitter::producing(vec![("track_000.m4a", vec![0u8; 48])]);
        let service = SegmentationService::new(store, splitter, config_in(scratch.path()));

        service.process("track.m4a").await.unwrap();

        let written = fs::read(scratch.path().join("track.m4a")).unwrap();
        assert_eq!(written, data);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_split_and_publish() {
        let scratch = tempfile::tempdir().unwrap();
        let store = InMemoryStore::new(); // no objects
        let splitter = ScriptedSplitter::producing(vec![]);
        let service = SegmentationService::new(store, splitter, config_in(scratch.path()));

        let result = service.process("missing.m4a").await;

        assert!(matches!(result, Err(SegmentationError::FetchFailure(_))));
        assert_eq!(service.splitter.call_count(), 0);
        assert!(service.store.uploaded_keys().is_empty());
    }

    #[tokio::test]
    async fn test_splitter_error_aborts_before_publish() {
        let scratch = tempfile::tempdir().unwrap();
        let store =
            InMemoryStore::new().with_object("mixradio-obj-bucket", "track.m4a", vec![0u8; 10]);
        let splitter = ScriptedSplitter::failing("Invalid data found when processing input");
        let service = SegmentationService::new(store, splitter, config_in(scratch.path()));

        let summary = service.run("track.m4a").await;

        match summary {
            RunSummary::Error { error } => {
                assert_eq!(
                    error,
                    "FFmpeg Error: Invalid data found when processing input"
                );
            }
            RunSummary::Success { .. } => panic!("expected error summary"),
        }
        assert!(service.store.uploaded_keys().is_empty());
    }

    #[tokio::test]
    async fn test_second_upload_failure_aborts_remaining() {
        let scratch = tempfile::tempdir().unwrap();
        let store = InMemoryStore::new()
            .with_object("mixradio-obj-bucket", "track.m4a", vec![0u8; 10])
            .failing_upload_at(1);
        let splitter = ScriptedSplitter::producing(vec![
            ("track_000.m4a", vec![1u8; 5]),
            ("track_001.m4a", vec![2u8; 5]),
            ("track_002.m4a", vec![3u8; 5]),
        ]);
        let service = SegmentationService::new(store, splitter, config_in(scratch.path()));

        let result = service.process("track.m4a").await;

        assert!(matches!(result, Err(SegmentationError::PublishFailure(_))));
        // The first chunk's upload happened before the abort; nothing after it.
        assert_eq!(service.store.uploaded_keys(), vec!["chunks/track_000.m4a"]);
    }

    #[tokio::test]
    async fn test_run_collapses_errors_into_summary() {
        let scratch = tempfile::tempdir().unwrap();
        let store = InMemoryStore::new();
        let splitter = ScriptedSplitter::producing(vec![]);
        let service = SegmentationService::new(store, splitter, config_in(scratch.path()));

        let summary = service.run("missing.m4a").await;

        assert!(!summary.is_success());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "error");
    }

    #[tokio::test]
    async fn test_encoded_key_decoded_before_fetch() {
        let scratch = tempfile::tempdir().unwrap();
        let store =
            InMemoryStore::new().with_object("mixradio-obj-bucket", "my file.m4a", vec![0u8; 8]);
        let splitter = ScriptedSplitter::producing(vec![("my file_000.m4a", vec![0u8; 8])]);
        let service = SegmentationService::new(store, splitter, config_in(scratch.path()));

        let chunks = service.process("my+file.m4a").await.unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_key, "chunks/my file_000.m4a");
    }

    #[test]
    fn test_default_config_values() {
        let config = SegmentationConfig::default();

        assert_eq!(config.source_bucket, "mixradio-obj-bucket");
        assert_eq!(config.chunks_bucket, "mixradio-chunks-bucket");
        assert_eq!(config.chunk_seconds, 20);
        assert_eq!(config.chunk_key_prefix, "chunks/");
        assert_eq!(config.content_type, "audio/m4a");
    }
}
