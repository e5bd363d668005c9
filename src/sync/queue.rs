use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What kind of change a queue item describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncItemKind {
    /// A tracking record was created or mutated
    TrackingChanged,
    /// A shipment record was created or mutated by an external editor
    ShipmentChanged,
}

/// One unit of sync work.
///
/// Owned exclusively by the sync engine and never persisted across process
/// restarts; a restart simply re-reconciles from the collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncQueueItem {
    pub kind: SyncItemKind,
    /// Serialized record the change refers to
    pub payload: Value,
    pub enqueued_at: DateTime<Utc>,
}

impl SyncQueueItem {
    pub fn new(kind: SyncItemKind, payload: Value) -> Self {
        Self {
            kind,
            payload,
            enqueued_at: Utc::now(),
        }
    }
}
