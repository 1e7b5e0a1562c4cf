//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - World generation runs (outcome, duration, status polls)
//! - Asset downloads
//!
//! Metrics are created lazily; the binary registers them with its registry
//! through [`register`].

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// =============================================================================
// Generation Metrics
// =============================================================================

/// Generation runs by outcome.
pub static GENERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("worldforge_generations_total", "Total world generation runs"),
        &["result"], // "ok" or a GenerationError kind
    )
    .unwrap()
});

/// Generation duration in seconds, upload through terminal state.
pub static GENERATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "worldforge_generation_duration_seconds",
            "Duration of world generation runs",
        )
        .buckets(vec![
            5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 900.0, 1800.0,
        ]),
        &["result"],
    )
    .unwrap()
});

/// Operation status requests issued.
pub static OPERATION_POLLS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "worldforge_operation_polls_total",
        "Total operation status requests",
    )
    .unwrap()
});

// =============================================================================
// Download Metrics
// =============================================================================

/// Asset downloads by result.
pub static ASSET_DOWNLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("worldforge_asset_downloads_total", "Total asset downloads"),
        &["result"], // "success", "failed"
    )
    .unwrap()
});

/// Bytes written by asset downloads.
pub static ASSET_DOWNLOAD_BYTES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "worldforge_asset_download_bytes_total",
        "Total bytes downloaded for assets",
    )
    .unwrap()
});

/// Register all core metrics with `registry`.
pub fn register(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(GENERATIONS_TOTAL.clone()))?;
    registry.register(Box::new(GENERATION_DURATION.clone()))?;
    registry.register(Box::new(OPERATION_POLLS_TOTAL.clone()))?;
    registry.register(Box::new(ASSET_DOWNLOADS_TOTAL.clone()))?;
    registry.register(Box::new(ASSET_DOWNLOAD_BYTES.clone()))?;
    Ok(())
}
