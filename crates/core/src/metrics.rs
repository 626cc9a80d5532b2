//! Prometheus metrics for the ingestion pipeline.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts};

/// Sheet fetch attempts by outcome ("direct", "proxy", "failed").
pub static SHEET_FETCH_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "panelboard_sheet_fetch_attempts_total",
            "Sheet fetch attempts by outcome",
        ),
        &["result"],
    )
    .unwrap()
});

/// Time to a successful sheet fetch, by route.
pub static SHEET_FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "panelboard_sheet_fetch_duration_seconds",
            "Duration of successful sheet fetches",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0]),
        &["route"],
    )
    .unwrap()
});

/// Rows parsed per fetched sheet.
pub static SHEET_ROWS_FETCHED: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "panelboard_sheet_rows_fetched",
            "Rows parsed per fetched sheet",
        )
        .buckets(vec![0.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0]),
    )
    .unwrap()
});

/// Refresh cycles by result ("success", "failed", "skipped").
pub static REFRESH_CYCLES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "panelboard_refresh_cycles_total",
            "Snapshot refresh cycles by result",
        ),
        &["result"],
    )
    .unwrap()
});

/// Board aggregation requests by round.
pub static BOARD_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "panelboard_board_requests_total",
            "Board aggregation requests by round",
        ),
        &["round"],
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SHEET_FETCH_ATTEMPTS.clone()),
        Box::new(SHEET_FETCH_DURATION.clone()),
        Box::new(SHEET_ROWS_FETCHED.clone()),
        Box::new(REFRESH_CYCLES.clone()),
        Box::new(BOARD_REQUESTS.clone()),
    ]
}
