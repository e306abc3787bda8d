//! # publy-realtime
//!
//! In-memory publish/subscribe engine for Publy. Provides:
//!
//! - A channel registry keyed by name, creating a channel on first join and
//!   removing it when its last listener leaves
//! - Per-channel listener sets with fan-out to bounded subscriber sinks
//! - Drop (default) or block delivery when a subscriber falls behind
//! - Engine-level counters for connections, channels and deliveries
//!
//! ```text
//!                     Arc<ChannelRegistry>
//!               ┌──────────────────────────────┐
//!               │ DashMap<name, Arc<Channel>>  │
//!               └──────────────┬───────────────┘
//!                              │
//!        ┌─────────────────────┼─────────────────────┐
//!        ▼                     ▼                     ▼
//!   [publisher]           [session]             [session]
//!   get().broadcast()     subscribe() + recv()  subscribe() + recv()
//!        │                     ▲                     ▲
//!        └──► try_deliver ─────┴─────────────────────┘
//! ```

pub mod channel;
pub mod connection;
pub mod metrics;
pub mod server;

pub use channel::{
    BroadcastReport, Channel, ChannelRegistry, DeliveryPolicy, JoinOutcome, RegistryStats,
};
pub use connection::{DeliveryOutcome, Payload, Sink, SinkId, SinkReceiver};
pub use metrics::{EngineMetrics, MetricsSnapshot};
pub use server::{EngineStats, RelayEngine};
