//! HTTP handlers.

pub mod channel;
pub mod health;
pub mod publish;
pub mod ws;
