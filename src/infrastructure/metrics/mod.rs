//! Prometheus Metrics Module
//!
//! Provides relay-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Platform events by outcome (accepted, filtered)
//! - Relayed and dropped messages, dropped by reason
//! - Fellow chats created
//! - Forward latency histogram
//! - Dispatch queue depth gauge

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Platform events seen by the listener, by outcome ("accepted", "filtered")
pub static EVENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("events_total", "Platform events observed by the listener")
            .namespace("fellow_relay"),
        &["outcome"],
    )
    .expect("Failed to create EVENTS_TOTAL metric")
});

/// Messages delivered to a fellow chat
pub static MESSAGES_RELAYED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("messages_relayed_total", "Messages delivered to a fellow chat")
            .namespace("fellow_relay"),
    )
    .expect("Failed to create MESSAGES_RELAYED_TOTAL metric")
});

/// Messages dropped, by reason ("shutdown", "store", "creation", "delivery", ...)
pub static MESSAGES_DROPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("messages_dropped_total", "Messages dropped without delivery")
            .namespace("fellow_relay"),
        &["reason"],
    )
    .expect("Failed to create MESSAGES_DROPPED_TOTAL metric")
});

/// Fellow chats created on first sight of a source group
pub static GROUPS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("groups_created_total", "Fellow chats created").namespace("fellow_relay"),
    )
    .expect("Failed to create GROUPS_CREATED_TOTAL metric")
});

/// Forward latency histogram, by result ("ok", "error")
pub static FORWARD_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new(
            "forward_duration_seconds",
            "Time to resolve and deliver one message",
        )
        .namespace("fellow_relay")
        .buckets(buckets),
        &["result"],
    )
    .expect("Failed to create FORWARD_DURATION_SECONDS metric")
});

/// Messages waiting in the dispatch queue
pub static DISPATCH_QUEUE_DEPTH: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("dispatch_queue_depth", "Messages waiting in the dispatch queue")
            .namespace("fellow_relay"),
    )
    .expect("Failed to create DISPATCH_QUEUE_DEPTH metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(EVENTS_TOTAL.clone()))
        .expect("Failed to register EVENTS_TOTAL");
    registry
        .register(Box::new(MESSAGES_RELAYED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_RELAYED_TOTAL");
    registry
        .register(Box::new(MESSAGES_DROPPED_TOTAL.clone()))
        .expect("Failed to register MESSAGES_DROPPED_TOTAL");
    registry
        .register(Box::new(GROUPS_CREATED_TOTAL.clone()))
        .expect("Failed to register GROUPS_CREATED_TOTAL");
    registry
        .register(Box::new(FORWARD_DURATION_SECONDS.clone()))
        .expect("Failed to register FORWARD_DURATION_SECONDS");
    registry
        .register(Box::new(DISPATCH_QUEUE_DEPTH.clone()))
        .expect("Failed to register DISPATCH_QUEUE_DEPTH");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_event(accepted: bool) {
    let outcome = if accepted { "accepted" } else { "filtered" };
    EVENTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_relayed(duration_secs: f64) {
    MESSAGES_RELAYED_TOTAL.inc();
    FORWARD_DURATION_SECONDS
        .with_label_values(&["ok"])
        .observe(duration_secs);
}

pub fn record_dropped(reason: &str) {
    MESSAGES_DROPPED_TOTAL.with_label_values(&[reason]).inc();
}

pub fn record_forward_failure(reason: &str, duration_secs: f64) {
    record_dropped(reason);
    FORWARD_DURATION_SECONDS
        .with_label_values(&["error"])
        .observe(duration_secs);
}

pub fn record_group_created() {
    GROUPS_CREATED_TOTAL.inc();
}

pub fn set_queue_depth(depth: usize) {
    DISPATCH_QUEUE_DEPTH.set(depth as i64);
}
