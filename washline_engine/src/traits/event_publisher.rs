use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("Channel {channel} is closed, so {event} was not delivered")]
    ChannelClosed { channel: String, event: String },
    #[error("Could not deliver {event} on {channel}: {reason}")]
    Transport { channel: String, event: String, reason: String },
}

impl PublishError {
    pub fn channel_closed(channel: impl Into<String>, event: impl Into<String>) -> Self {
        Self::ChannelClosed { channel: channel.into(), event: event.into() }
    }

    pub fn transport(channel: impl Into<String>, event: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport { channel: channel.into(), event: event.into(), reason: reason.into() }
    }
}

/// The outbound side of the real-time event system.
///
/// The engine names a private channel (see [`crate::events::naming`]), an event name and a JSON
/// payload; the implementation carries them to connected clients. [`crate::events::RelayPublisher`]
/// feeds the in-process relay, and host applications can implement this for an external push service
/// instead.
#[allow(async_fn_in_trait)]
pub trait EventPublisher: Clone {
    async fn publish(&self, channel: &str, event: &str, payload: Value) -> Result<(), PublishError>;
}
