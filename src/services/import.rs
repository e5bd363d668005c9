//! # Import Ingestion
//!
//! Consumes already-tabular rows from the parsing collaborator, turns them
//! into canonical tracking records, and announces the batch on the bus. File
//! parsing itself (CSV/Excel) happens upstream; this service only sees rows.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::classification::classify_with_default;
use crate::constants::topics;
use crate::error::{CargoflowError, Result};
use crate::events::{EventBus, Origin};
use crate::models::{Tracking, TrackingType};
use crate::normalization::normalize_status;
use crate::persistence::RecordStore;

/// One tabular row as delivered by the parsing collaborator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportRow {
    pub tracking_number: String,
    pub tracking_type: Option<String>,
    pub carrier_code: Option<String>,
    pub status: Option<String>,
    pub origin_port: Option<String>,
    pub destination_port: Option<String>,
    pub reference_number: Option<String>,
}

/// Outcome of one import batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub accepted: usize,
    pub skipped_duplicates: usize,
    pub rejected: usize,
}

pub struct ImportService {
    store: Arc<dyn RecordStore>,
    bus: EventBus,
}

impl ImportService {
    pub fn new(store: Arc<dyn RecordStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    /// Ingest a batch of rows.
    ///
    /// Rows without a tracking number are rejected and logged; rows whose
    /// number already exists in the collection are skipped. Accepted rows are
    /// persisted in one save and announced with a single `tracking_imported`
    /// notification carrying the new ids.
    pub async fn import_rows(&self, rows: Vec<ImportRow>) -> Result<ImportSummary> {
        let mut trackings = self.store.list_trackings().await?;
        let mut known_numbers: HashSet<String> = trackings
            .iter()
            .map(|t| t.tracking_number.to_ascii_uppercase())
            .collect();

        let mut summary = ImportSummary::default();
        let mut imported_numbers = Vec::new();

        for row in rows {
            match self.row_to_tracking(&row, &known_numbers) {
                Ok(Some(tracking)) => {
                    known_numbers.insert(tracking.tracking_number.to_ascii_uppercase());
                    imported_numbers.push(tracking.tracking_number.clone());
                    trackings.push(tracking);
                    summary.accepted += 1;
                }
                Ok(None) => summary.skipped_duplicates += 1,
                Err(e) => {
                    warn!(error = %e, "Import row rejected");
                    summary.rejected += 1;
                }
            }
        }

        if !imported_numbers.is_empty() {
            self.store.save_trackings(trackings).await?;
            self.bus
                .publish(
                    topics::TRACKING_IMPORTED,
                    json!({ "tracking_numbers": imported_numbers }),
                    Origin::External,
                )
                .map_err(|e| CargoflowError::EventError(e.to_string()))?;
        }

        info!(
            accepted = summary.accepted,
            skipped = summary.skipped_duplicates,
            rejected = summary.rejected,
            "Import batch processed"
        );
        Ok(summary)
    }

    fn row_to_tracking(
        &self,
        row: &ImportRow,
        known_numbers: &HashSet<String>,
    ) -> Result<Option<Tracking>> {
        let number = row.tracking_number.trim();
        if number.is_empty() {
            return Err(CargoflowError::ValidationError(
                "Import row has no tracking number".to_string(),
            ));
        }
        if known_numbers.contains(&number.to_ascii_uppercase()) {
            return Ok(None);
        }

        // Import sheets are dominated by ocean freight; untyped rows stay in
        // the container pipeline instead of the parcel one
        let classification = classify_with_default(number, TrackingType::Container);
        let tracking_type = row
            .tracking_type
            .as_deref()
            .and_then(|t| TrackingType::from_str(t.trim()).ok())
            .unwrap_or(classification.tracking_type);

        let carrier = row
            .carrier_code
            .as_deref()
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty())
            .unwrap_or(classification.carrier_guess);

        let mut tracking = Tracking::new(number, tracking_type)
            .with_carrier(carrier)
            .with_status(normalize_status(row.status.as_deref().unwrap_or_default()));
        tracking.origin_port = row.origin_port.clone().filter(|p| !p.trim().is_empty());
        tracking.destination_port = row
            .destination_port
            .clone()
            .filter(|p| !p.trim().is_empty());
        tracking.reference_number = row
            .reference_number
            .clone()
            .filter(|r| !r.trim().is_empty());

        Ok(Some(tracking))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalStatus;
    use crate::persistence::InMemoryStore;

    fn service_with_store() -> (ImportService, Arc<InMemoryStore>, EventBus) {
        let store = Arc::new(InMemoryStore::new());
        let bus = EventBus::new(16);
        let service = ImportService::new(store.clone(), bus.clone());
        (service, store, bus)
    }

    fn row(number: &str) -> ImportRow {
        ImportRow {
            tracking_number: number.to_string(),
            ..ImportRow::default()
        }
    }

    #[tokio::test]
    async fn test_import_classifies_untyped_rows() {
        let (service, store, _bus) = service_with_store();

        let summary = service
            .import_rows(vec![row("MSKU1234567"), row("176-12345678")])
            .await
            .unwrap();
        assert_eq!(summary.accepted, 2);

        let trackings = store.list_trackings().await.unwrap();
        assert_eq!(trackings[0].tracking_type, TrackingType::Container);
        assert_eq!(trackings[0].carrier_code, "MAERSK");
        assert_eq!(trackings[1].tracking_type, TrackingType::Awb);
    }

    #[tokio::test]
    async fn test_import_normalizes_statuses() {
        let (service, store, _bus) = service_with_store();

        let mut sailing = row("MAEU7654321");
        sailing.status = Some("Sailing".to_string());
        let mut discharged = row("MSCU7654321");
        discharged.status = Some("Discharged".to_string());

        service.import_rows(vec![sailing, discharged]).await.unwrap();

        let trackings = store.list_trackings().await.unwrap();
        assert_eq!(trackings[0].status, CanonicalStatus::InTransit);
        assert_eq!(trackings[1].status, CanonicalStatus::Arrived);
    }

    #[tokio::test]
    async fn test_duplicates_and_blanks() {
        let (service, _store, _bus) = service_with_store();

        service.import_rows(vec![row("MSKU1234567")]).await.unwrap();
        let summary = service
            .import_rows(vec![row("MSKU1234567"), row("msku1234567"), row("   ")])
            .await
            .unwrap();

        assert_eq!(summary.accepted, 0);
        assert_eq!(summary.skipped_duplicates, 2);
        assert_eq!(summary.rejected, 1);
    }

    #[tokio::test]
    async fn test_import_publishes_notification() {
        let (service, _store, bus) = service_with_store();
        let mut receiver = bus.subscribe();

        service.import_rows(vec![row("MSKU1234567")]).await.unwrap();

        let notification = receiver.recv().await.unwrap();
        assert_eq!(notification.topic, topics::TRACKING_IMPORTED);
        assert_eq!(notification.origin, Origin::External);
    }

    #[tokio::test]
    async fn test_empty_batch_publishes_nothing() {
        let (service, _store, bus) = service_with_store();
        let mut receiver = bus.subscribe();

        let summary = service.import_rows(vec![row("")]).await.unwrap();
        assert_eq!(summary.rejected, 1);
        assert!(receiver.try_recv().is_err());
    }
}
