//! Request parsing helpers.

pub mod channel_name;

pub use channel_name::{is_websocket_request, parse_channel_name};
