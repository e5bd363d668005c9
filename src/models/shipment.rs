use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::ShipmentStatus;

/// Business-level shipment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentType {
    /// Full container load
    Container,
    /// Bill-of-lading covered ocean freight
    Bl,
    /// Air freight
    Awb,
    /// Less-than-container / groupage (parcels fold into this)
    Lcl,
}

impl fmt::Display for ShipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Bl => write!(f, "bl"),
            Self::Awb => write!(f, "awb"),
            Self::Lcl => write!(f, "lcl"),
        }
    }
}

/// Carrier descriptor on a shipment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Carrier {
    pub name: String,
    pub code: String,
    pub service: Option<String>,
}

/// A geographic endpoint, optionally enriched from provider metadata
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoutePoint {
    pub name: String,
    pub country: Option<String>,
}

/// Route description orthogonal to tracking data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub origin: Option<RoutePoint>,
    pub destination: Option<RoutePoint>,
    pub via: Vec<RoutePoint>,
    pub distance_km: Option<f64>,
    pub estimated_transit_days: Option<u32>,
}

/// Planned and actual departure/arrival times
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub etd: Option<DateTime<Utc>>,
    pub eta: Option<DateTime<Utc>>,
    pub atd: Option<DateTime<Utc>>,
    pub ata: Option<DateTime<Utc>>,
}

/// One cost line on a shipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostItem {
    pub description: String,
    pub amount: f64,
    pub currency: String,
}

/// One product line on a shipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub sku: String,
    pub description: String,
    pub quantity: u32,
}

/// Business-level shipment record, optionally linked to a tracking record.
///
/// Created by external UI edits or auto-created by the sync engine; the
/// engine only ever writes the fields covered by its mapping rules, never
/// whole-record replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    /// Mirrors the linked tracking number
    pub shipment_number: String,
    /// Back-reference to the tracking collection
    pub tracking_number: String,
    pub shipment_type: ShipmentType,
    pub status: ShipmentStatus,
    pub carrier: Carrier,
    pub route: Route,
    pub schedule: Schedule,
    pub costs: Vec<CostItem>,
    pub products: Vec<Product>,
    pub reference_number: Option<String>,
    /// True when the sync engine created this record
    pub auto_created: bool,
    /// Id of the tracking record this shipment was built from
    pub source_tracking_id: Option<Uuid>,
    /// Last time the sync engine wrote mapped fields
    pub last_sync_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    pub fn new(shipment_number: impl Into<String>, shipment_type: ShipmentType) -> Self {
        let number = shipment_number.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            shipment_number: number.clone(),
            tracking_number: number,
            shipment_type,
            status: ShipmentStatus::Planned,
            carrier: Carrier::default(),
            route: Route::default(),
            schedule: Schedule::default(),
            costs: Vec::new(),
            products: Vec::new(),
            reference_number: None,
            auto_created: false,
            source_tracking_id: None,
            last_sync_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.costs.iter().map(|c| c.amount).sum()
    }

    /// Mark the record mutated now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
