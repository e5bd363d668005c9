use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;
use crate::models::{Shipment, Tracking};
use crate::persistence::RecordStore;

/// In-memory record store used by tests and demos.
///
/// Collections are replaced wholesale on save, mirroring the
/// whole-collection contract of the persistence boundary.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    trackings: RwLock<Vec<Tracking>>,
    shipments: RwLock<Vec<Shipment>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(trackings: Vec<Tracking>, shipments: Vec<Shipment>) -> Self {
        Self {
            trackings: RwLock::new(trackings),
            shipments: RwLock::new(shipments),
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list_trackings(&self) -> Result<Vec<Tracking>> {
        Ok(self.trackings.read().clone())
    }

    async fn list_shipments(&self) -> Result<Vec<Shipment>> {
        Ok(self.shipments.read().clone())
    }

    async fn save_trackings(&self, trackings: Vec<Tracking>) -> Result<()> {
        *self.trackings.write() = trackings;
        Ok(())
    }

    async fn save_shipments(&self, shipments: Vec<Shipment>) -> Result<()> {
        *self.shipments.write() = shipments;
        Ok(())
    }
}
