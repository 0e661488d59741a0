//! Test doubles for the real-time event side.

use std::sync::{Arc, Mutex};

use serde_json::Value;
use washline_engine::{EventPublisher, PublishError};

/// Records every published event instead of delivering it anywhere.
#[derive(Clone, Debug, Default)]
pub struct CapturePublisher {
    published: Arc<Mutex<Vec<(String, String, Value)>>>,
}

impl CapturePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, as `(channel, event, payload)` tuples in publish order.
    pub fn records(&self) -> Vec<(String, String, Value)> {
        self.published.lock().unwrap().clone()
    }

    pub fn count_for(&self, channel: &str, event: &str) -> usize {
        self.published.lock().unwrap().iter().filter(|(c, e, _)| c == channel && e == event).count()
    }

    pub fn total(&self) -> usize {
        self.published.lock().unwrap().len()
    }
}

impl EventPublisher for CapturePublisher {
    async fn publish(&self, channel: &str, event: &str, payload: Value) -> Result<(), PublishError> {
        self.published.lock().unwrap().push((channel.to_string(), event.to_string(), payload));
        Ok(())
    }
}

/// Fails every publish, as a dead push service would.
#[derive(Clone, Debug)]
pub struct FailingPublisher;

impl EventPublisher for FailingPublisher {
    async fn publish(&self, channel: &str, event: &str, _payload: Value) -> Result<(), PublishError> {
        Err(PublishError::transport(channel, event, "publisher offline"))
    }
}
