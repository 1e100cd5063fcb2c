//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Fingerprinting
//! - Search (planning, backend calls, scoring)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Fingerprinter
// =============================================================================

/// Fingerprints computed, by status.
pub static FINGERPRINTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subhound_fingerprints_total", "Total file fingerprints computed"),
        &["status"], // "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Search
// =============================================================================

/// Searches by result.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subhound_searches_total", "Total subtitle searches"),
        &["result"], // "success", "validation_error", "io_error", "backend_error"
    )
    .unwrap()
});

/// End-to-end search duration in seconds.
pub static SEARCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "subhound_search_duration_seconds",
            "Duration of a complete search",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

/// Query tiers planned, by tier kind.
pub static TIERS_PLANNED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("subhound_tiers_planned_total", "Total query tiers planned"),
        &["tier"],
    )
    .unwrap()
});

/// Backend requests by tier and status.
pub static BACKEND_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subhound_backend_requests_total",
            "Total subtitle backend requests",
        ),
        &["tier", "status"],
    )
    .unwrap()
});

/// Candidates removed before scoring, by reason.
pub static CANDIDATES_DROPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "subhound_candidates_dropped_total",
            "Total candidates dropped during scoring",
        ),
        &["reason"], // "malformed", "duplicate", "format", "imdb", "episode"
    )
    .unwrap()
});

/// Candidates that survived filtering, per search.
pub static CANDIDATES_SCORED: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "subhound_candidates_scored",
            "Number of candidates scored per search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 500.0]),
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Fingerprinter
        Box::new(FINGERPRINTS_TOTAL.clone()),
        // Search
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(SEARCH_DURATION.clone()),
        Box::new(TIERS_PLANNED.clone()),
        Box::new(BACKEND_REQUESTS.clone()),
        Box::new(CANDIDATES_DROPPED.clone()),
        Box::new(CANDIDATES_SCORED.clone()),
    ]
}
