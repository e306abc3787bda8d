//! Named broadcast channels and the registry that owns them.

pub mod channel;
pub mod delivery;
pub mod registry;

pub use channel::{Channel, JoinOutcome};
pub use delivery::{BroadcastReport, DeliveryPolicy};
pub use registry::{ChannelRegistry, RegistryStats};
