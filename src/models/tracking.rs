use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::models::CanonicalStatus;

/// Kind of identifier a tracking record follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingType {
    /// ISO 6346 container number (4 letters + 7 digits)
    Container,
    /// Ocean bill of lading
    Bl,
    /// Air waybill (3-digit airline prefix + 8 digits)
    Awb,
    /// Courier parcel
    Parcel,
}

impl fmt::Display for TrackingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Bl => write!(f, "bl"),
            Self::Awb => write!(f, "awb"),
            Self::Parcel => write!(f, "parcel"),
        }
    }
}

impl std::str::FromStr for TrackingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "container" => Ok(Self::Container),
            "bl" => Ok(Self::Bl),
            "awb" => Ok(Self::Awb),
            "parcel" => Ok(Self::Parcel),
            _ => Err(format!("Invalid tracking type: {s}")),
        }
    }
}

/// Where a tracking lookup result came from, for observability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Fresh provider response
    Live,
    /// Served from the lookup cache
    Cache,
    /// Deterministic fallback when the provider is unreachable or unconfigured
    Synthetic,
}

/// One entry of a unit's movement history, newest first after normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub date: Option<DateTime<Utc>>,
    pub status: CanonicalStatus,
    pub description: String,
    pub location: Option<String>,
}

/// Canonical representation of one carrier-tracked shipment unit.
///
/// Created by import, manual entry, or provider polling; mutated by provider
/// refresh or reverse sync from a shipment. The sync engine never hard-deletes
/// tracking records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tracking {
    /// Opaque stable identifier; never changes after creation
    pub id: Uuid,
    /// Carrier-facing identifier; non-empty, unique within the collection
    pub tracking_number: String,
    pub tracking_type: TrackingType,
    /// Canonical carrier code, "UNKNOWN" when classification had no match
    pub carrier_code: String,
    pub status: CanonicalStatus,
    pub origin_port: Option<String>,
    pub destination_port: Option<String>,
    pub eta: Option<DateTime<Utc>>,
    pub departure_date: Option<DateTime<Utc>>,
    pub reference_number: Option<String>,
    /// Movement history, sorted descending by date
    pub events: Vec<TrackingEvent>,
    /// Original provider payload and derived flags, retained for audit
    pub metadata: HashMap<String, serde_json::Value>,
    pub data_source: DataSource,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tracking {
    /// Create a minimal record; callers layer provider data on top
    pub fn new(tracking_number: impl Into<String>, tracking_type: TrackingType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tracking_number: tracking_number.into(),
            tracking_type,
            carrier_code: crate::constants::system::UNKNOWN_CARRIER.to_string(),
            status: CanonicalStatus::Registered,
            origin_port: None,
            destination_port: None,
            eta: None,
            departure_date: None,
            reference_number: None,
            events: Vec::new(),
            metadata: HashMap::new(),
            data_source: DataSource::Synthetic,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_carrier(mut self, carrier_code: impl Into<String>) -> Self {
        self.carrier_code = carrier_code.into();
        self
    }

    pub fn with_status(mut self, status: CanonicalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_route(
        mut self,
        origin_port: impl Into<String>,
        destination_port: impl Into<String>,
    ) -> Self {
        self.origin_port = Some(origin_port.into());
        self.destination_port = Some(destination_port.into());
        self
    }

    pub fn with_eta(mut self, eta: DateTime<Utc>) -> Self {
        self.eta = Some(eta);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference_number = Some(reference.into());
        self
    }

    pub fn with_data_source(mut self, source: DataSource) -> Self {
        self.data_source = source;
        self
    }

    /// Check the record carries the fields the sync engine requires
    pub fn has_required_fields(&self) -> bool {
        !self.tracking_number.trim().is_empty()
    }

    /// Mark the record mutated now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tracking_defaults() {
        let tracking = Tracking::new("MSKU1234567", TrackingType::Container);
        assert_eq!(tracking.tracking_number, "MSKU1234567");
        assert_eq!(tracking.status, CanonicalStatus::Registered);
        assert_eq!(tracking.carrier_code, "UNKNOWN");
        assert!(tracking.has_required_fields());
        assert_eq!(tracking.created_at, tracking.updated_at);
    }

    #[test]
    fn test_builder_methods() {
        let eta = Utc::now();
        let tracking = Tracking::new("176-12345678", TrackingType::Awb)
            .with_carrier("EMIRATES")
            .with_status(CanonicalStatus::InTransit)
            .with_route("DXB", "MXP")
            .with_eta(eta)
            .with_reference("PO-2024-001");
        assert_eq!(tracking.carrier_code, "EMIRATES");
        assert_eq!(tracking.origin_port.as_deref(), Some("DXB"));
        assert_eq!(tracking.eta, Some(eta));
        assert_eq!(tracking.reference_number.as_deref(), Some("PO-2024-001"));
    }

    #[test]
    fn test_blank_number_fails_required_fields() {
        let tracking = Tracking::new("   ", TrackingType::Parcel);
        assert!(!tracking.has_required_fields());
    }
}
