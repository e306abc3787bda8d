//! Single channel with its listener set and fan-out.
//!
//! A channel lives from its first join until the join/leave that empties
//! it. The 1→0 transition marks the channel closed while the listener lock
//! is held, so a racing `join` either lands before the transition or sees
//! the closed flag and goes back to the registry for a fresh channel.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use publy_core::config::DeliveryMode;

use crate::connection::sink::{DeliveryOutcome, Payload, Sink};
use crate::metrics::{EngineMetrics, channels, messages};

use super::delivery::{BroadcastReport, DeliveryPolicy};
use super::registry;

/// Name → channel map shared by the registry and its channels.
pub(crate) type ChannelMap = DashMap<String, Arc<Channel>>;

/// Result of [`Channel::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The sink is now (or already was) a listener.
    Joined,
    /// The channel lost its last listener and is no longer registered.
    Closed,
}

/// A named broadcast group.
pub struct Channel {
    name: String,
    listeners: RwLock<Vec<Arc<Sink>>>,
    /// Mirrors `listeners.len()` for lock-free reads.
    listener_count: AtomicUsize,
    /// Set once, on the 1→0 listener transition.
    closed: AtomicBool,
    delivery: DeliveryPolicy,
    registry: Weak<ChannelMap>,
    metrics: Arc<EngineMetrics>,
}

impl Channel {
    pub(crate) fn new(
        name: String,
        delivery: DeliveryPolicy,
        registry: Weak<ChannelMap>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            name,
            listeners: RwLock::new(Vec::new()),
            listener_count: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
            delivery,
            registry,
            metrics,
        }
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current number of listeners.
    pub fn listener_count(&self) -> usize {
        self.listener_count.load(Ordering::SeqCst)
    }

    /// Whether the last listener has left.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Open and holding at least one listener.
    pub fn is_live(&self) -> bool {
        !self.is_closed() && self.listener_count() > 0
    }

    /// Adds `sink` to the listener set.
    ///
    /// Joining twice with the same sink is a no-op. Returns
    /// [`JoinOutcome::Closed`] if the channel has already been emptied;
    /// the caller must resolve the name through the registry again.
    pub async fn join(&self, sink: Arc<Sink>) -> JoinOutcome {
        let mut listeners = self.listeners.write().await;

        if self.is_closed() {
            debug!(channel = %self.name, sink = %sink.id(), "Join raced channel close");
            return JoinOutcome::Closed;
        }

        if listeners.iter().any(|s| s.id() == sink.id()) {
            return JoinOutcome::Joined;
        }

        listeners.push(sink.clone());
        self.listener_count.store(listeners.len(), Ordering::SeqCst);

        info!(
            channel = %self.name,
            sink = %sink.id(),
            listeners = listeners.len(),
            "Listener joined"
        );

        JoinOutcome::Joined
    }

    /// Removes `sink` from the listener set.
    ///
    /// Unknown sinks are ignored. When the last listener leaves, the channel
    /// closes and unregisters itself. Returns whether a listener was removed.
    pub async fn leave(&self, sink: &Sink) -> bool {
        let emptied = {
            let mut listeners = self.listeners.write().await;

            let Some(pos) = listeners.iter().position(|s| s.id() == sink.id()) else {
                channels::record_stale_leave(&self.metrics);
                debug!(channel = %self.name, sink = %sink.id(), "Leave for unknown listener");
                return false;
            };

            listeners.swap_remove(pos);
            self.listener_count.store(listeners.len(), Ordering::SeqCst);

            info!(
                channel = %self.name,
                sink = %sink.id(),
                listeners = listeners.len(),
                "Listener left"
            );

            if listeners.is_empty() {
                self.closed.store(true, Ordering::SeqCst);
                true
            } else {
                false
            }
        };

        if emptied {
            if let Some(map) = self.registry.upgrade() {
                registry::remove_closed(&map, &self.name, &self.metrics);
            }
        }

        true
    }

    /// Closes the channel if nobody has joined it, or everybody has left.
    ///
    /// Returns whether the channel is closed afterwards. A `join` racing
    /// this call either lands first, keeping the channel open, or observes
    /// [`JoinOutcome::Closed`].
    pub(crate) async fn close_if_empty(&self) -> bool {
        let listeners = self.listeners.write().await;
        if listeners.is_empty() {
            self.closed.store(true, Ordering::SeqCst);
        }
        self.is_closed()
    }

    /// Fans `payload` out to every current listener.
    ///
    /// Runs against the listener set as it is when the read lock is taken;
    /// joins and leaves wait until the fan-out finishes, so a sink never
    /// receives a payload after its `leave` returned. In drop mode a full or
    /// closed sink is skipped. In block mode every sink is awaited
    /// concurrently, bounded by the policy timeout.
    pub async fn broadcast(&self, payload: impl Into<Payload>) -> BroadcastReport {
        let payload: Payload = payload.into();
        let listeners = self.listeners.read().await;

        debug!(
            channel = %self.name,
            listeners = listeners.len(),
            bytes = payload.len(),
            "Broadcasting message"
        );

        let outcomes: Vec<(&Arc<Sink>, DeliveryOutcome)> = match self.delivery.mode {
            DeliveryMode::Drop => listeners
                .iter()
                .map(|sink| (sink, sink.try_deliver(&payload)))
                .collect(),
            DeliveryMode::Block => {
                let timeout = self.delivery.block_timeout;
                let sends = listeners.iter().map(|sink| {
                    let payload = &payload;
                    async move { (sink, sink.deliver(payload, timeout).await) }
                });
                join_all(sends).await
            }
        };

        let mut report = BroadcastReport {
            listeners: listeners.len(),
            ..BroadcastReport::default()
        };

        for (sink, outcome) in outcomes {
            match outcome {
                DeliveryOutcome::Delivered => report.delivered += 1,
                DeliveryOutcome::Full => {
                    report.dropped += 1;
                    warn!(channel = %self.name, sink = %sink.id(), "Listener queue full, dropping message");
                }
                DeliveryOutcome::Closed => {
                    report.dropped += 1;
                    debug!(channel = %self.name, sink = %sink.id(), "Listener closed, dropping message");
                }
            }
        }

        messages::record_broadcast(
            &self.metrics,
            report.delivered as u64,
            report.dropped as u64,
        );

        report
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("listeners", &self.listener_count())
            .field("closed", &self.is_closed())
            .field("delivery", &self.delivery)
            .finish()
    }
}
