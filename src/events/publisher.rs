use serde_json::Value;
use tokio::sync::broadcast;

use crate::events::types::{Notification, Origin};

/// Notification bus connecting the collections, the import pipeline, and the
/// sync engine.
///
/// Passed into the sync engine's constructor rather than reached through a
/// global, so tests can run against their own bus deterministically.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Notification>,
}

impl EventBus {
    /// Create a new bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notification on a topic.
    ///
    /// Publishing with no subscribers is not an error; collections publish
    /// regardless of whether the engine is running.
    pub fn publish(
        &self,
        topic: impl Into<String>,
        payload: Value,
        origin: Origin,
    ) -> Result<(), PublishError> {
        let notification = Notification::new(topic, payload, origin);
        match self.sender.send(notification) {
            Ok(_) => Ok(()),
            Err(broadcast::error::SendError(_)) => Ok(()),
        }
    }

    /// Subscribe to all notifications
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Error types for notification publishing
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("Notification channel is closed")]
    ChannelClosed,
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::topics;
    use serde_json::json;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = EventBus::new(16);
        let mut receiver = bus.subscribe();

        bus.publish(
            topics::TRACKINGS_UPDATED,
            json!({"tracking_number": "MSKU1234567"}),
            Origin::External,
        )
        .unwrap();

        let notification = receiver.recv().await.unwrap();
        assert_eq!(notification.topic, topics::TRACKINGS_UPDATED);
        assert_eq!(notification.origin, Origin::External);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::new(16);
        assert!(bus
            .publish(topics::SHIPMENTS_UPDATED, json!({}), Origin::AutoSync)
            .is_ok());
    }

    #[tokio::test]
    async fn test_subscriber_count() {
        let bus = EventBus::new(16);
        assert_eq!(bus.subscriber_count(), 0);
        let _rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
    }
}
