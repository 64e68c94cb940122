//! Stream Deck host surface: wire protocol and WebSocket connection

pub mod connection;
pub mod protocol;

pub use connection::{connect, HostHandle};
pub use protocol::{ActionEvent, InboundEvent, OutboundMessage, PropertyInspectorEvent};
