//! Fan-out delivery policy and per-broadcast results.

use std::time::Duration;

use serde::Serialize;

use publy_core::config::{DeliveryMode, RelayConfig};

/// How a channel hands a payload to a sink that has no room for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryPolicy {
    /// Drop or block.
    pub mode: DeliveryMode,
    /// Per-sink wait bound in block mode; `None` waits until the sink drains or closes.
    pub block_timeout: Option<Duration>,
}

impl DeliveryPolicy {
    /// Skip full sinks.
    pub fn dropping() -> Self {
        Self::default()
    }

    /// Wait for full sinks, optionally bounded.
    pub fn blocking(timeout: Option<Duration>) -> Self {
        Self {
            mode: DeliveryMode::Block,
            block_timeout: timeout,
        }
    }
}

impl From<&RelayConfig> for DeliveryPolicy {
    fn from(config: &RelayConfig) -> Self {
        Self {
            mode: config.delivery_mode,
            block_timeout: config.block_timeout(),
        }
    }
}

/// Outcome of one `broadcast` call. Diagnostic only; publishers are never
/// failed because of an individual subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    /// Listeners in the snapshot the broadcast ran against.
    pub listeners: usize,
    /// Sinks that queued the payload.
    pub delivered: usize,
    /// Sinks that were full, timed out or closed.
    pub dropped: usize,
}
