use once_cell::sync::Lazy;
use prometheus::{
    register_histogram, register_int_counter_vec, Histogram, IntCounterVec,
};

pub static FETCH_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "gh_activity_fetch_requests_total",
        "Event feed requests sent to GitHub grouped by outcome",
        &["outcome"]
    )
    .expect("fetch requests total")
});

pub static FETCH_LATENCY_SECONDS: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "gh_activity_fetch_latency_seconds",
        "Latency of event feed requests in seconds",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0]
    )
    .expect("fetch latency histogram")
});

pub static NORMALIZED_EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "gh_activity_normalized_events_total",
        "Events kept by the time window grouped by event type",
        &["type"]
    )
    .expect("normalized events total")
});

pub static ANALYSIS_RUNS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "gh_activity_analysis_runs_total",
        "User analyses grouped by outcome (ok, empty, error)",
        &["outcome"]
    )
    .expect("analysis runs total")
});
