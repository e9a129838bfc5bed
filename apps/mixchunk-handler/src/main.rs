//! MixChunk Handler - Event-triggered audio segmentation
//!
//! One execution per S3 notification: fetch the named `.m4a` object, split it
//! into fixed 20-second chunks with ffmpeg, upload each chunk to the
//! destination bucket, and print the Result Summary JSON to stdout. The
//! summary is the invocation's sole output channel; every failure is reported
//! through its error variant, never as a crash.

mod trigger;

use std::io::Read;

use anyhow::{Context, Result};
use aws_lambda_events::event::s3::S3Event;
use tracing::{error, info};

use mixchunk_domain::{RunSummary, SegmentationConfig, SegmentationService};
use mixchunk_ffmpeg::{FfmpegSplitter, DEFAULT_FFMPEG_PATH};
use mixchunk_s3::S3ObjectStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("Starting MixChunk handler");

    // Load environment variables
    dotenvy::dotenv().ok();

    let event = read_event().context("failed to read S3 event notification")?;

    // Initialize AWS S3 client with MinIO-compatible configuration
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true) // Required for MinIO
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    let config = config_from_env();
    info!(
        source_bucket = %config.source_bucket,
        chunks_bucket = %config.chunks_bucket,
        "Initializing segmentation service"
    );

    let store = S3ObjectStore::new(s3_client);
    let splitter = FfmpegSplitter::with_path(
        std::env::var("MIXCHUNK_FFMPEG_PATH").unwrap_or_else(|_| DEFAULT_FFMPEG_PATH.to_string()),
    );
    let service = SegmentationService::new(store, splitter, config);

    let summary = match trigger::object_key(&event) {
        Ok(raw_key) => service.run(&raw_key).await,
        Err(err) => {
            error!(error = %err, "Rejected trigger notification");
            RunSummary::from(err)
        }
    };

    // The summary is the sole output channel of an invocation.
    println!("{}", serde_json::to_string(&summary)?);

    Ok(())
}

/// Build the pipeline configuration, applying environment overrides
fn config_from_env() -> SegmentationConfig {
    let mut config = SegmentationConfig::default();

    if let Ok(bucket) = std::env::var("MIXCHUNK_SOURCE_BUCKET") {
        config.source_bucket = bucket;
    }
    if let Ok(bucket) = std::env::var("MIXCHUNK_CHUNKS_BUCKET") {
        config.chunks_bucket = bucket;
    }
    if let Ok(dir) = std::env::var("MIXCHUNK_SCRATCH_DIR") {
        config.scratch_dir = dir.into();
    }

    config
}

/// Read the S3 event JSON from the first argument (a file path) or stdin
fn read_event() -> Result<S3Event> {
    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read event file '{}'", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read event from stdin")?;
            buf
        }
    };

    serde_json::from_str(&raw).context("failed to parse S3 event JSON")
}
