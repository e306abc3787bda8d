//! Relay engine metrics.

pub mod channels;
pub mod connections;
pub mod messages;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Subscriber sessions ever opened
    pub connections_total: AtomicU64,
    /// Subscriber sessions currently open
    pub connections_active: AtomicU64,
    /// Channels created on first join
    pub channels_created: AtomicU64,
    /// Channels removed after their last listener left
    pub channels_removed: AtomicU64,
    /// Broadcast calls
    pub messages_published: AtomicU64,
    /// Payloads queued into subscriber sinks
    pub deliveries: AtomicU64,
    /// Payloads skipped because a sink was full or closed
    pub deliveries_dropped: AtomicU64,
    /// Leave calls for sinks that were not joined
    pub stale_leaves: AtomicU64,
}

impl EngineMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            channels_created: self.channels_created.load(Ordering::Relaxed),
            channels_removed: self.channels_removed.load(Ordering::Relaxed),
            messages_published: self.messages_published.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            deliveries_dropped: self.deliveries_dropped.load(Ordering::Relaxed),
            stale_leaves: self.stale_leaves.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Subscriber sessions ever opened
    pub connections_total: u64,
    /// Subscriber sessions currently open
    pub connections_active: u64,
    /// Channels created
    pub channels_created: u64,
    /// Channels removed
    pub channels_removed: u64,
    /// Broadcast calls
    pub messages_published: u64,
    /// Successful per-sink deliveries
    pub deliveries: u64,
    /// Dropped per-sink deliveries
    pub deliveries_dropped: u64,
    /// Leave calls that found nothing to remove
    pub stale_leaves: u64,
}
