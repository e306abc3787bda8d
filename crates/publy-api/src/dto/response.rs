//! Response DTOs.

use serde::{Deserialize, Serialize};

use publy_realtime::RegistryStats;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Channels with at least one listener.
    pub channels: usize,
    /// Listeners across all channels.
    pub listeners: usize,
}

impl From<RegistryStats> for HealthResponse {
    fn from(stats: RegistryStats) -> Self {
        Self {
            channels: stats.channels,
            listeners: stats.listeners,
        }
    }
}
