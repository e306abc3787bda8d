//! Directory of active channels, keyed by name.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use publy_core::error::AppError;
use publy_core::result::AppResult;

use crate::connection::sink::{Payload, Sink};
use crate::metrics::{EngineMetrics, channels};

use super::channel::{Channel, ChannelMap, JoinOutcome};
use super::delivery::{BroadcastReport, DeliveryPolicy};

/// Registry of all active channels.
///
/// At most one open [`Channel`] exists per name. A name that is absent, or
/// whose channel has no listeners, reads as "no subscribers".
#[derive(Debug)]
pub struct ChannelRegistry {
    /// Channel name → Channel.
    channels: Arc<ChannelMap>,
    /// Delivery policy handed to every new channel.
    delivery: DeliveryPolicy,
    /// Metrics.
    metrics: Arc<EngineMetrics>,
}

/// Aggregate registry counts, as reported by the health endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Channels with at least one listener.
    pub channels: usize,
    /// Listeners across those channels.
    pub listeners: usize,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    pub fn new(delivery: DeliveryPolicy, metrics: Arc<EngineMetrics>) -> Self {
        Self {
            channels: Arc::new(ChannelMap::new()),
            delivery,
            metrics,
        }
    }

    /// Delivery policy applied to channels created by this registry.
    pub fn delivery(&self) -> DeliveryPolicy {
        self.delivery
    }

    /// Metrics shared with this registry's channels.
    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    /// Returns the channel registered for `name`, creating it if needed.
    ///
    /// The boolean is `true` when this call created the channel. A channel
    /// that closed but is still awaiting removal is replaced rather than
    /// returned. A created channel stays registered until a sink joins and
    /// later leaves it, or until [`remove`](Self::remove) retires it, so
    /// callers that end up not joining should call `remove`.
    pub fn get_or_create(&self, name: &str) -> AppResult<(Arc<Channel>, bool)> {
        if name.is_empty() {
            return Err(AppError::validation("Channel name must not be empty"));
        }

        let result = match self.channels.entry(name.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_closed() {
                    let channel = self.new_channel(name);
                    occupied.insert(channel.clone());
                    channels::record_removed(&self.metrics);
                    channels::record_created(&self.metrics);
                    info!(channel = %name, "Replaced closed channel");
                    (channel, true)
                } else {
                    (occupied.get().clone(), false)
                }
            }
            Entry::Vacant(vacant) => {
                let channel = self.new_channel(name);
                vacant.insert(channel.clone());
                channels::record_created(&self.metrics);
                info!(channel = %name, "Creating channel");
                (channel, true)
            }
        };

        Ok(result)
    }

    /// Looks up the channel for `name` without side effects.
    ///
    /// Channels with no listeners are reported as absent.
    pub fn get(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels
            .get(name)
            .filter(|entry| entry.value().is_live())
            .map(|entry| entry.value().clone())
    }

    /// Unregisters `name` if its channel has no listeners. Idempotent.
    ///
    /// Channels unregister themselves when their last listener leaves; this
    /// also retires entries that were created but never joined. A channel
    /// with listeners is never removed.
    pub async fn remove(&self, name: &str) -> bool {
        let Some(channel) = self.channels.get(name).map(|entry| entry.value().clone()) else {
            return false;
        };
        if !channel.close_if_empty().await {
            return false;
        }
        remove_closed(&self.channels, name, &self.metrics)
    }

    /// Number of registered entries, including channels not yet joined.
    pub fn entry_count(&self) -> usize {
        self.channels.len()
    }

    /// Joins `sink` to the channel for `name`, creating the channel if needed.
    ///
    /// Retries when the resolved channel closes between lookup and join.
    pub async fn subscribe(&self, name: &str, sink: Arc<Sink>) -> AppResult<Arc<Channel>> {
        loop {
            let (channel, created) = self.get_or_create(name)?;
            match channel.join(sink.clone()).await {
                JoinOutcome::Joined => {
                    debug!(channel = %name, sink = %sink.id(), created, "Subscribed");
                    return Ok(channel);
                }
                JoinOutcome::Closed => continue,
            }
        }
    }

    /// Broadcasts `payload` to the channel for `name`.
    ///
    /// Fails with a not-found error when nobody is subscribed.
    pub async fn publish(&self, name: &str, payload: impl Into<Payload>) -> AppResult<BroadcastReport> {
        let channel = self
            .get(name)
            .ok_or_else(|| AppError::not_found(format!("No channel: {name}")))?;
        Ok(channel.broadcast(payload).await)
    }

    /// Number of channels with at least one listener.
    pub fn channel_count(&self) -> usize {
        self.channels
            .iter()
            .filter(|entry| entry.value().is_live())
            .count()
    }

    /// Channel and listener totals.
    pub fn stats(&self) -> RegistryStats {
        self.channels
            .iter()
            .filter(|entry| entry.value().is_live())
            .fold(RegistryStats::default(), |mut acc, entry| {
                acc.channels += 1;
                acc.listeners += entry.value().listener_count();
                acc
            })
    }

    fn new_channel(&self, name: &str) -> Arc<Channel> {
        Arc::new(Channel::new(
            name.to_string(),
            self.delivery,
            Arc::downgrade(&self.channels),
            self.metrics.clone(),
        ))
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new(DeliveryPolicy::default(), Arc::new(EngineMetrics::new()))
    }
}

/// Removes the entry for `name` only if its channel is closed.
pub(crate) fn remove_closed(map: &ChannelMap, name: &str, metrics: &EngineMetrics) -> bool {
    let removed = map.remove_if(name, |_, channel| channel.is_closed()).is_some();
    if removed {
        channels::record_removed(metrics);
        info!(channel = %name, "Removing channel");
    }
    removed
}
