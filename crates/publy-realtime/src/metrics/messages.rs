//! Message metrics helpers.

use std::sync::atomic::Ordering;

use super::EngineMetrics;

/// Record one broadcast and its per-sink results
pub fn record_broadcast(metrics: &EngineMetrics, delivered: u64, dropped: u64) {
    metrics.messages_published.fetch_add(1, Ordering::Relaxed);
    metrics.deliveries.fetch_add(delivered, Ordering::Relaxed);
    metrics
        .deliveries_dropped
        .fetch_add(dropped, Ordering::Relaxed);
}
