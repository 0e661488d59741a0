//! Real-time events: wire names, payload types, and the in-process relay.

mod event_types;
mod relay;

pub mod naming;

pub use event_types::*;
pub use relay::{EventEnvelope, EventRelay, RelayHandler, RelayPublisher};
