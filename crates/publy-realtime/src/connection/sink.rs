//! Per-subscriber outbound queue.
//!
//! A [`Sink`] is the write half the channel fans out into; the owning
//! session keeps the matching [`SinkReceiver`] and forwards whatever it
//! drains to its transport. Sinks are compared by [`SinkId`] only.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use uuid::Uuid;

/// A published message. Cloning only bumps a reference count.
pub type Payload = Arc<str>;

/// Opaque identity of a subscriber sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(Uuid);

impl SinkId {
    /// Allocates a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SinkId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of handing one payload to one sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The payload was queued.
    Delivered,
    /// The queue had no room (or the block-mode wait timed out).
    Full,
    /// The receiving session is gone.
    Closed,
}

/// Write half of a subscriber queue, shared with the channel it joined.
pub struct Sink {
    id: SinkId,
    sender: mpsc::Sender<Payload>,
}

impl Sink {
    /// Creates a sink with room for `capacity` undelivered payloads.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero, like [`mpsc::channel`].
    pub fn bounded(capacity: usize) -> (Arc<Self>, SinkReceiver) {
        let (sender, rx) = mpsc::channel(capacity);
        let id = SinkId::new();
        let sink = Arc::new(Self { id, sender });
        (sink, SinkReceiver { id, rx })
    }

    /// Sink identity.
    pub fn id(&self) -> SinkId {
        self.id
    }

    /// Whether the receiving half has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Queues `payload` without waiting.
    pub fn try_deliver(&self, payload: &Payload) -> DeliveryOutcome {
        match self.sender.try_send(payload.clone()) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(TrySendError::Full(_)) => DeliveryOutcome::Full,
            Err(TrySendError::Closed(_)) => DeliveryOutcome::Closed,
        }
    }

    /// Queues `payload`, waiting for room for at most `timeout` (forever if `None`).
    pub async fn deliver(&self, payload: &Payload, timeout: Option<Duration>) -> DeliveryOutcome {
        match timeout {
            Some(limit) => match self.sender.send_timeout(payload.clone(), limit).await {
                Ok(()) => DeliveryOutcome::Delivered,
                Err(SendTimeoutError::Timeout(_)) => DeliveryOutcome::Full,
                Err(SendTimeoutError::Closed(_)) => DeliveryOutcome::Closed,
            },
            None => match self.sender.send(payload.clone()).await {
                Ok(()) => DeliveryOutcome::Delivered,
                Err(_) => DeliveryOutcome::Closed,
            },
        }
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Read half of a subscriber queue, owned by the session.
#[derive(Debug)]
pub struct SinkReceiver {
    id: SinkId,
    rx: mpsc::Receiver<Payload>,
}

impl SinkReceiver {
    /// Identity of the matching [`Sink`].
    pub fn id(&self) -> SinkId {
        self.id
    }

    /// Waits for the next payload. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Payload> {
        self.rx.recv().await
    }

    /// Takes a queued payload if one is ready.
    pub fn try_recv(&mut self) -> Option<Payload> {
        self.rx.try_recv().ok()
    }
}
