use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who caused a change notification.
///
/// Every notification carries its origin so the sync engine can drop the
/// notifications it emitted itself instead of re-processing them. This is the
/// single load-bearing cycle-prevention check in the system; it is a typed
/// enum rather than a string field on the payload so the check cannot drift
/// out of convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// External editor, import pipeline, or provider refresh
    External,
    /// Emitted by the sync engine while propagating a change
    AutoSync,
}

/// A change notification published on the bus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// One of the topics in [`crate::constants::topics`]
    pub topic: String,
    pub payload: Value,
    pub origin: Origin,
    pub published_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(topic: impl Into<String>, payload: Value, origin: Origin) -> Self {
        Self {
            topic: topic.into(),
            payload,
            origin,
            published_at: Utc::now(),
        }
    }

    /// Check whether the sync engine emitted this notification itself
    pub fn is_auto_sync(&self) -> bool {
        self.origin == Origin::AutoSync
    }
}
