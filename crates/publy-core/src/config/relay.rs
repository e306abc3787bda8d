//! Relay engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What `Broadcast` does when a subscriber's queue cannot take a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Skip the subscriber for this message. Publishers never wait.
    #[default]
    Drop,
    /// Wait for queue space, bounded by `block_timeout_ms` when non-zero.
    Block,
}

/// Relay (channel registry + sessions) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Delivery policy for full subscriber queues.
    #[serde(default)]
    pub delivery_mode: DeliveryMode,
    /// Upper bound per subscriber in block mode; `0` waits indefinitely.
    #[serde(default)]
    pub block_timeout_ms: u64,
    /// Per-subscriber outbound queue capacity.
    #[serde(default = "default_sink_capacity")]
    pub sink_capacity: usize,
    /// Total lifetime of a subscriber session in seconds; `0` means unbounded.
    #[serde(default)]
    pub session_timeout_seconds: u64,
    /// WebSocket ping interval in seconds; `0` disables keepalive pings.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Channel-name rules applied by the routing layer.
    #[serde(default)]
    pub channel_names: ChannelNamePolicy,
}

impl RelayConfig {
    /// Block-mode wait bound, `None` when unbounded.
    pub fn block_timeout(&self) -> Option<Duration> {
        (self.block_timeout_ms > 0).then(|| Duration::from_millis(self.block_timeout_ms))
    }

    /// Session lifetime bound, `None` when unbounded.
    pub fn session_timeout(&self) -> Option<Duration> {
        (self.session_timeout_seconds > 0).then(|| Duration::from_secs(self.session_timeout_seconds))
    }

    /// Keepalive ping interval, `None` when disabled.
    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_seconds > 0).then(|| Duration::from_secs(self.ping_interval_seconds))
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            delivery_mode: DeliveryMode::default(),
            block_timeout_ms: 0,
            sink_capacity: default_sink_capacity(),
            session_timeout_seconds: 0,
            ping_interval_seconds: default_ping_interval(),
            channel_names: ChannelNamePolicy::default(),
        }
    }
}

/// Shape rules for channel names taken from request paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelNamePolicy {
    /// Minimum name length in bytes.
    #[serde(default = "default_min_length")]
    pub min_length: usize,
    /// Whether `/` may appear inside a name.
    #[serde(default = "default_true")]
    pub allow_slash: bool,
}

impl Default for ChannelNamePolicy {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            allow_slash: true,
        }
    }
}

fn default_sink_capacity() -> usize {
    64
}

fn default_ping_interval() -> u64 {
    30
}

fn default_min_length() -> usize {
    16
}

fn default_true() -> bool {
    true
}
