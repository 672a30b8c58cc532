//! Internal metrics collection.
//!
//! Counters and latency histograms kept in-memory; exposed through the
//! health endpoint and structured logs rather than an external metrics
//! system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// A counter metric.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_by(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) -> u64 {
        self.0.swap(0, Ordering::Relaxed)
    }
}

/// Histogram for latency tracking.
#[derive(Debug)]
pub struct Histogram {
    /// Buckets: 1ms, 5ms, 10ms, 25ms, 50ms, 100ms, 250ms, 500ms, 1s, 5s, 10s
    buckets: [AtomicU64; 11],
    sum: AtomicU64,
    count: AtomicU64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new()
    }
}

impl Histogram {
    const BUCKET_BOUNDS: [u64; 11] = [1, 5, 10, 25, 50, 100, 250, 500, 1000, 5000, 10000];

    pub fn new() -> Self {
        Self {
            buckets: Default::default(),
            sum: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Records a value in milliseconds.
    pub fn observe(&self, ms: u64) {
        self.sum.fetch_add(ms, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);

        for (i, &bound) in Self::BUCKET_BOUNDS.iter().enumerate() {
            if ms <= bound {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
                return;
            }
        }
        // Value exceeds all buckets, add to last
        self.buckets[10].fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> u64 {
        self.sum.load(Ordering::Relaxed)
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();
        if count == 0 {
            0.0
        } else {
            self.sum() as f64 / count as f64
        }
    }

    /// Returns bucket counts.
    pub fn buckets(&self) -> Vec<(u64, u64)> {
        Self::BUCKET_BOUNDS
            .iter()
            .zip(self.buckets.iter())
            .map(|(&bound, count)| (bound, count.load(Ordering::Relaxed)))
            .collect()
    }
}

/// Collected metrics for the lead engine.
#[derive(Debug, Default)]
pub struct Metrics {
    // Intake metrics
    pub submissions_received: Counter,
    pub submissions_rejected: Counter,
    pub rate_limited_requests: Counter,

    // Pipeline metrics
    pub leads_created: Counter,
    pub repeat_leads_detected: Counter,
    pub touchpoints_recorded: Counter,
    pub profile_scores_computed: Counter,

    // Degradation metrics (lookup failures recovered with defaults)
    pub session_lookup_failures: Counter,
    pub activity_lookup_failures: Counter,
    pub conversion_mark_failures: Counter,
    pub touchpoint_write_failures: Counter,

    // Latency histograms
    pub ingest_latency_ms: Histogram,
    pub lead_insert_latency_ms: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub submissions_received: u64,
    pub submissions_rejected: u64,
    pub rate_limited_requests: u64,
    pub leads_created: u64,
    pub repeat_leads_detected: u64,
    pub touchpoints_recorded: u64,
    pub session_lookup_failures: u64,
    pub activity_lookup_failures: u64,
    pub ingest_latency_mean_ms: f64,
    pub lead_insert_latency_mean_ms: f64,
}

impl Metrics {
    /// Takes a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            submissions_received: self.submissions_received.get(),
            submissions_rejected: self.submissions_rejected.get(),
            rate_limited_requests: self.rate_limited_requests.get(),
            leads_created: self.leads_created.get(),
            repeat_leads_detected: self.repeat_leads_detected.get(),
            touchpoints_recorded: self.touchpoints_recorded.get(),
            session_lookup_failures: self.session_lookup_failures.get(),
            activity_lookup_failures: self.activity_lookup_failures.get(),
            ingest_latency_mean_ms: self.ingest_latency_ms.mean(),
            lead_insert_latency_mean_ms: self.lead_insert_latency_ms.mean(),
        }
    }
}

/// Global metrics registry.
pub static METRICS: std::sync::LazyLock<Metrics> = std::sync::LazyLock::new(Metrics::new);

/// Get the global metrics instance.
pub fn metrics() -> &'static Metrics {
    &METRICS
}
