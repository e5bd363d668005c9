//! # Startup Reconciliation
//!
//! One-time scan of both collections run when the engine initializes.
//! Orphaned trackings are reported for operator confirmation instead of
//! auto-created, so a bulk provider import cannot silently fan out into
//! hundreds of shipments.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{Shipment, Tracking};

/// A tracking record with no shipment covering its number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanReport {
    pub tracking_id: Uuid,
    pub tracking_number: String,
}

/// A tracking number covered by more than one shipment. The engine reports
/// the condition and links against the oldest record; resolution is an
/// operator concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateLinkReport {
    pub tracking_number: String,
    pub shipment_ids: Vec<Uuid>,
}

/// Outcome of one reconciliation scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub orphans: Vec<OrphanReport>,
    pub duplicate_links: Vec<DuplicateLinkReport>,
    pub scanned_trackings: usize,
    pub scanned_shipments: usize,
}

impl ReconciliationReport {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty() && self.duplicate_links.is_empty()
    }
}

/// Scan both collections once. Pure over its inputs.
pub fn scan(trackings: &[Tracking], shipments: &[Shipment]) -> ReconciliationReport {
    let mut by_number: HashMap<String, Vec<&Shipment>> = HashMap::new();
    for shipment in shipments {
        by_number
            .entry(shipment.tracking_number.to_ascii_uppercase())
            .or_default()
            .push(shipment);
    }

    let orphans = trackings
        .iter()
        .filter(|t| !by_number.contains_key(&t.tracking_number.to_ascii_uppercase()))
        .map(|t| OrphanReport {
            tracking_id: t.id,
            tracking_number: t.tracking_number.clone(),
        })
        .collect();

    let mut duplicate_links: Vec<DuplicateLinkReport> = by_number
        .iter()
        .filter(|(_, matched)| matched.len() > 1)
        .map(|(number, matched)| DuplicateLinkReport {
            tracking_number: number.clone(),
            shipment_ids: matched.iter().map(|s| s.id).collect(),
        })
        .collect();
    duplicate_links.sort_by(|a, b| a.tracking_number.cmp(&b.tracking_number));

    ReconciliationReport {
        orphans,
        duplicate_links,
        scanned_trackings: trackings.len(),
        scanned_shipments: shipments.len(),
    }
}
