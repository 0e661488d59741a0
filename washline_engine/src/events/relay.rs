//! A simple in-process relay between the engine and whatever delivers events to clients.
//!
//! The engine publishes [`EventEnvelope`]s through a [`RelayPublisher`]; the relay feeds each one to
//! the handler the host application registered (a websocket broadcaster, a push-service client, a test
//! probe). Handlers are stateless and async, and each envelope is handled on its own task.

use std::{
    future::Future,
    pin::Pin,
    sync::{atomic::AtomicI64, Arc},
};

use log::*;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::traits::{EventPublisher, PublishError};

/// One published event: the private channel it belongs on, the event name, and the JSON payload.
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    pub channel: String,
    pub event: String,
    pub payload: Value,
}

pub type RelayHandler = Arc<dyn Fn(EventEnvelope) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventRelay {
    listener: mpsc::Receiver<EventEnvelope>,
    sender: mpsc::Sender<EventEnvelope>,
    handler: RelayHandler,
}

impl EventRelay {
    pub fn new(buffer_size: usize, handler: RelayHandler) -> Self {
        let (sender, receiver) = mpsc::channel(buffer_size);
        Self { listener: receiver, sender, handler }
    }

    pub fn publisher(&self) -> RelayPublisher {
        RelayPublisher { sender: self.sender.clone() }
    }

    pub async fn start_relay(mut self) {
        debug!("📡️ Starting event relay");
        // drop the internal sender so that when the last publisher is dropped, the relay shuts itself
        // down
        drop(self.sender);
        let jobs = Arc::new(AtomicI64::new(0));
        while let Some(envelope) = self.listener.recv().await {
            trace!("📡️ Relaying {} on {}", envelope.event, envelope.channel);
            let handler = Arc::clone(&self.handler);
            jobs.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let job = jobs.clone();
            tokio::spawn(async move {
                (handler)(envelope).await;
                job.fetch_sub(1, std::sync::atomic::Ordering::Relaxed);
                trace!("📡️ Envelope handled");
            });
        }
        match tokio::spawn(async move {
            while jobs.load(std::sync::atomic::Ordering::SeqCst) > 0 {
                debug!("📡️ Waiting for in-flight envelopes to complete");
                tokio::time::sleep(tokio::time::Duration::from_millis(1000)).await;
            }
        })
        .await
        {
            Ok(_) => {
                debug!("📡️ Event relay shutting down gracefully");
            },
            Err(e) => {
                warn!("📡️ Event relay shutdown process failed: {e}. Some envelopes may not have been handled.");
            },
        }
        debug!("📡️ Event relay has shut down");
    }
}

/// The sending half of the relay. Cheap to clone; the relay stops once every publisher is dropped.
#[derive(Clone)]
pub struct RelayPublisher {
    sender: mpsc::Sender<EventEnvelope>,
}

impl EventPublisher for RelayPublisher {
    async fn publish(&self, channel: &str, event: &str, payload: Value) -> Result<(), PublishError> {
        let envelope = EventEnvelope { channel: channel.to_string(), event: event.to_string(), payload };
        self.sender.send(envelope).await.map_err(|_| PublishError::channel_closed(channel, event))
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::AtomicU64;

    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_event_relay() {
        let _ = env_logger::try_init();
        let count = Arc::new(AtomicU64::new(0));
        let c2 = count.clone();
        let handler = Arc::new(move |envelope: EventEnvelope| {
            let count = count.clone();
            Box::pin(async move {
                debug!("Handler received {} on {}", envelope.event, envelope.channel);
                let v = envelope.payload["v"].as_u64().unwrap_or_default();
                let _ = count.fetch_add(v, std::sync::atomic::Ordering::SeqCst);
                tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        let relay = EventRelay::new(1, handler);
        let publisher_1 = relay.publisher();
        let publisher_2 = relay.publisher();
        tokio::spawn(async move {
            for i in 0..5u64 {
                let v = i * 2 + 1;
                publisher_1.publish("private-client-c1", "new-notification", json!({ "v": v })).await.unwrap();
                debug!("P1 publishing {v}");
            }
        });
        tokio::spawn(async move {
            for i in 0..5u64 {
                let v = i * 2;
                publisher_2.publish("private-admin-a1", "update-order-status", json!({ "v": v })).await.unwrap();
                debug!("P2 publishing {v}");
            }
        });

        relay.start_relay().await;
        debug!("Relay done");
        assert_eq!(c2.load(std::sync::atomic::Ordering::SeqCst), 45);
    }
}
