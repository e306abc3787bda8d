//! Top-level relay engine that ties the registry, metrics and shutdown together.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::info;

use publy_core::config::RelayConfig;

use crate::channel::delivery::DeliveryPolicy;
use crate::channel::registry::ChannelRegistry;
use crate::metrics::{EngineMetrics, MetricsSnapshot};

/// Central relay engine shared by every subscriber session and publish request.
#[derive(Clone)]
pub struct RelayEngine {
    /// Channel registry.
    pub channels: Arc<ChannelRegistry>,
    /// Metrics collector.
    pub metrics: Arc<EngineMetrics>,
    /// Relay configuration.
    config: Arc<RelayConfig>,
    /// When the engine started.
    started_at: DateTime<Utc>,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RelayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayEngine")
            .field("started_at", &self.started_at)
            .finish()
    }
}

/// Engine counters plus uptime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    /// Seconds since the engine started.
    pub uptime_seconds: i64,
    /// Channels with listeners right now.
    pub channels: usize,
    /// Listeners right now.
    pub listeners: usize,
    /// Cumulative counters.
    pub metrics: MetricsSnapshot,
}

impl RelayEngine {
    /// Creates a relay engine from configuration.
    pub fn new(config: RelayConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(EngineMetrics::new());
        let delivery = DeliveryPolicy::from(&config);
        let channels = Arc::new(ChannelRegistry::new(delivery, metrics.clone()));

        info!(
            delivery_mode = ?delivery.mode,
            block_timeout_ms = config.block_timeout_ms,
            sink_capacity = config.sink_capacity,
            "Relay engine initialized"
        );

        Self {
            channels,
            metrics,
            config: Arc::new(config),
            started_at: Utc::now(),
            shutdown_tx,
        }
    }

    /// Relay configuration.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Returns a shutdown receiver for subscriber sessions.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals every subscriber session to end.
    ///
    /// Sessions still leave their channels on the way out.
    pub fn shutdown(&self) {
        info!(
            sessions = self.shutdown_tx.receiver_count(),
            "Shutting down relay engine"
        );
        let _ = self.shutdown_tx.send(());
    }

    /// Current counters and uptime.
    pub fn stats(&self) -> EngineStats {
        let registry = self.channels.stats();
        EngineStats {
            uptime_seconds: (Utc::now() - self.started_at).num_seconds(),
            channels: registry.channels,
            listeners: registry.listeners,
            metrics: self.metrics.snapshot(),
        }
    }
}
