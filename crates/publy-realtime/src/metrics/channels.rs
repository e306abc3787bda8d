//! Channel lifecycle metrics helpers.

use std::sync::atomic::Ordering;

use super::EngineMetrics;

/// Record a channel created for a previously unseen name
pub fn record_created(metrics: &EngineMetrics) {
    metrics.channels_created.fetch_add(1, Ordering::Relaxed);
}

/// Record a channel removed from the registry
pub fn record_removed(metrics: &EngineMetrics) {
    metrics.channels_removed.fetch_add(1, Ordering::Relaxed);
}

/// Record a leave for a sink that was not in the listener set
pub fn record_stale_leave(metrics: &EngineMetrics) {
    metrics.stale_leaves.fetch_add(1, Ordering::Relaxed);
}
