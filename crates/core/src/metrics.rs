//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Orchestrator (runs, stage outcomes and durations)
//! - Remote gateway (requests by operation and outcome, latency)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Pipeline runs total by result.
pub static RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reunion_runs_total", "Total pipeline runs"),
        &["result"], // "done", "failed"
    )
    .unwrap()
});

/// Stage outcomes by stage and result.
pub static STAGE_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reunion_stage_outcomes_total", "Total stage outcomes"),
        &["stage", "result"], // result: "success" or an error class
    )
    .unwrap()
});

/// Stage duration in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reunion_stage_duration_seconds",
            "Duration of pipeline stages",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["stage"],
    )
    .unwrap()
});

// =============================================================================
// Remote Gateway Metrics
// =============================================================================

/// Remote requests total by operation and outcome.
pub static REMOTE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reunion_remote_requests_total", "Total remote requests"),
        &["operation", "outcome"], // outcome: "success" or an error class
    )
    .unwrap()
});

/// Remote request duration.
pub static REMOTE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "reunion_remote_duration_seconds",
            "Duration of remote requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 120.0]),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Orchestrator
        Box::new(RUNS_TOTAL.clone()),
        Box::new(STAGE_OUTCOMES.clone()),
        Box::new(STAGE_DURATION.clone()),
        // Remote gateway
        Box::new(REMOTE_REQUESTS.clone()),
        Box::new(REMOTE_DURATION.clone()),
    ]
}
