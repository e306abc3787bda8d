//! Subscriber-side delivery targets.

pub mod sink;

pub use sink::{DeliveryOutcome, Payload, Sink, SinkId, SinkReceiver};
