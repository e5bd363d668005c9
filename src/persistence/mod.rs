//! # Persistence Collaborator
//!
//! The storage boundary consumed by the sync engine and services. The engine
//! reacts to notifications rather than owning the data, so whatever sits
//! behind this trait (file, database, browser storage) is the authority for
//! conflicting concurrent writes; the engine's obligation is idempotence.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Shipment, Tracking};

/// Whole-collection persistence contract for the two record kinds.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_trackings(&self) -> Result<Vec<Tracking>>;

    async fn list_shipments(&self) -> Result<Vec<Shipment>>;

    async fn save_trackings(&self, trackings: Vec<Tracking>) -> Result<()>;

    async fn save_shipments(&self, shipments: Vec<Shipment>) -> Result<()>;
}

pub use memory::InMemoryStore;
