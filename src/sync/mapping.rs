//! # Field Mapping Rules
//!
//! Declarative tracking → shipment field mappings and the narrower reverse
//! set, realized as immutable lookup structures constructed once and injected
//! into the sync engine.
//!
//! ## Forward rules
//!
//! | Tracking field | Shipment field | Transform |
//! |---|---|---|
//! | tracking_number | shipment_number, tracking_number | identity |
//! | tracking_type | shipment_type | parcel folds into lcl |
//! | status | status | coarsening table |
//! | carrier_code | carrier.code/name | code passthrough + name lookup |
//! | origin/destination_port | route.origin/destination | wrap with country from metadata |
//! | eta | schedule.eta | identity |
//! | reference_number | reference_number | identity |
//!
//! Reverse propagation (shipment → tracking) covers only `status` and `eta`.
//! The asymmetry is deliberate: the narrow reverse set keeps an external
//! shipment edit from amplifying back into a full tracking rewrite.

use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::constants::{carriers, system};
use crate::error::{CargoflowError, Result};
use crate::models::{
    CanonicalStatus, Carrier, RoutePoint, Shipment, ShipmentStatus, ShipmentType, Tracking,
    TrackingType,
};

/// Immutable mapping tables shared by the engine. Built once at startup.
#[derive(Debug)]
pub struct MappingRules {
    carrier_names: HashMap<&'static str, &'static str>,
}

impl MappingRules {
    pub fn new() -> Self {
        Self {
            carrier_names: carriers::CARRIER_NAMES.iter().copied().collect(),
        }
    }

    /// Tracking type → shipment type. Parcels fold into groupage.
    pub fn map_type(&self, tracking_type: TrackingType) -> ShipmentType {
        match tracking_type {
            TrackingType::Container => ShipmentType::Container,
            TrackingType::Bl => ShipmentType::Bl,
            TrackingType::Awb => ShipmentType::Awb,
            TrackingType::Parcel => ShipmentType::Lcl,
        }
    }

    /// Canonical tracking status → coarser shipment status.
    ///
    /// Delay and exception are operational detail the business record does
    /// not distinguish; both read as still-in-transit. Customs clearance
    /// happens at the destination, so it reads as arrived.
    pub fn map_status(&self, status: CanonicalStatus) -> ShipmentStatus {
        match status {
            CanonicalStatus::Registered => ShipmentStatus::Planned,
            CanonicalStatus::InTransit
            | CanonicalStatus::OutForDelivery
            | CanonicalStatus::Delayed
            | CanonicalStatus::Exception => ShipmentStatus::InTransit,
            CanonicalStatus::Arrived | CanonicalStatus::CustomsCleared => ShipmentStatus::Arrived,
            CanonicalStatus::Delivered => ShipmentStatus::Delivered,
        }
    }

    /// Shipment status → tracking status for reverse propagation
    pub fn reverse_status(&self, status: ShipmentStatus) -> CanonicalStatus {
        match status {
            ShipmentStatus::Planned => CanonicalStatus::Registered,
            ShipmentStatus::InTransit => CanonicalStatus::InTransit,
            ShipmentStatus::Arrived => CanonicalStatus::Arrived,
            ShipmentStatus::Delivered => CanonicalStatus::Delivered,
        }
    }

    /// Resolve the carrier display name for a canonical code. Codes outside
    /// the table fall back to the code itself and are logged, never fatal.
    pub fn carrier_for(&self, code: &str) -> Carrier {
        let name = match self.carrier_names.get(code) {
            Some(name) => (*name).to_string(),
            None => {
                if code != system::UNKNOWN_CARRIER && code != system::GENERIC_CARRIER {
                    debug!(code, "Carrier code has no name mapping, passing through");
                }
                code.to_string()
            }
        };
        Carrier {
            name,
            code: code.to_string(),
            service: None,
        }
    }

    fn route_point(&self, port: &Option<String>, country: Option<&Value>) -> Option<RoutePoint> {
        port.as_ref().map(|name| RoutePoint {
            name: name.clone(),
            country: country.and_then(Value::as_str).map(str::to_string),
        })
    }

    /// Reject trackings the mapping rules cannot safely apply.
    ///
    /// A partial shipment is worse than no shipment; anything failing this
    /// guard is dropped before any shipment is touched.
    pub fn guard(&self, tracking: &Tracking) -> Result<()> {
        if !tracking.has_required_fields() {
            return Err(CargoflowError::ValidationError(format!(
                "Tracking {} has no tracking number, refusing to map",
                tracking.id
            )));
        }
        Ok(())
    }

    /// Build a new shipment from a tracking record.
    pub fn build_shipment(&self, tracking: &Tracking) -> Result<Shipment> {
        self.guard(tracking)?;

        let mut shipment = Shipment::new(
            tracking.tracking_number.clone(),
            self.map_type(tracking.tracking_type),
        );
        shipment.status = self.map_status(tracking.status);
        shipment.carrier = self.carrier_for(&tracking.carrier_code);
        shipment.route.origin =
            self.route_point(&tracking.origin_port, tracking.metadata.get("origin_country"));
        shipment.route.destination = self.route_point(
            &tracking.destination_port,
            tracking.metadata.get("destination_country"),
        );
        shipment.schedule.eta = tracking.eta;
        shipment.schedule.etd = tracking.departure_date;
        shipment.reference_number = tracking.reference_number.clone();
        shipment.auto_created = true;
        shipment.source_tracking_id = Some(tracking.id);
        shipment.last_sync_at = Some(Utc::now());
        Ok(shipment)
    }

    /// Apply forward rules to an existing shipment, field by field.
    ///
    /// Only the mapped fields are ever written; cost/product/route detail an
    /// operator added stays untouched. Returns the names of fields that
    /// actually changed, empty when the pair was already consistent.
    pub fn apply_to_shipment(
        &self,
        tracking: &Tracking,
        shipment: &mut Shipment,
    ) -> Result<Vec<&'static str>> {
        self.guard(tracking)?;

        let mut changed = Vec::new();

        if shipment.shipment_number != tracking.tracking_number {
            shipment.shipment_number = tracking.tracking_number.clone();
            changed.push("shipment_number");
        }
        if shipment.tracking_number != tracking.tracking_number {
            shipment.tracking_number = tracking.tracking_number.clone();
            changed.push("tracking_number");
        }

        let mapped_type = self.map_type(tracking.tracking_type);
        if shipment.shipment_type != mapped_type {
            shipment.shipment_type = mapped_type;
            changed.push("shipment_type");
        }

        let mapped_status = self.map_status(tracking.status);
        if shipment.status != mapped_status {
            shipment.status = mapped_status;
            changed.push("status");
        }

        let carrier = self.carrier_for(&tracking.carrier_code);
        if shipment.carrier.code != carrier.code {
            // Preserve an operator-entered service level, the mapping has no
            // opinion on it
            let service = shipment.carrier.service.take();
            shipment.carrier = Carrier { service, ..carrier };
            changed.push("carrier");
        }

        let origin =
            self.route_point(&tracking.origin_port, tracking.metadata.get("origin_country"));
        if origin.is_some() && shipment.route.origin != origin {
            shipment.route.origin = origin;
            changed.push("route.origin");
        }
        let destination = self.route_point(
            &tracking.destination_port,
            tracking.metadata.get("destination_country"),
        );
        if destination.is_some() && shipment.route.destination != destination {
            shipment.route.destination = destination;
            changed.push("route.destination");
        }

        if tracking.eta.is_some() && shipment.schedule.eta != tracking.eta {
            shipment.schedule.eta = tracking.eta;
            changed.push("schedule.eta");
        }

        if tracking.reference_number.is_some()
            && shipment.reference_number != tracking.reference_number
        {
            shipment.reference_number = tracking.reference_number.clone();
            changed.push("reference_number");
        }

        Ok(changed)
    }

    /// Apply the reverse rules: only `status` and `eta` flow back.
    ///
    /// A pair is considered status-consistent when the tracking's forward
    /// mapping already yields the shipment's status; that keeps a reverse
    /// pass from flattening `delayed`/`customs_cleared` into their coarser
    /// shipment equivalents.
    pub fn apply_to_tracking(
        &self,
        shipment: &Shipment,
        tracking: &mut Tracking,
    ) -> Vec<&'static str> {
        let mut changed = Vec::new();

        if self.map_status(tracking.status) != shipment.status {
            tracking.status = self.reverse_status(shipment.status);
            changed.push("status");
        }

        if shipment.schedule.eta.is_some() && tracking.eta != shipment.schedule.eta {
            tracking.eta = shipment.schedule.eta;
            changed.push("eta");
        }

        changed
    }
}

impl Default for MappingRules {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rules() -> MappingRules {
        MappingRules::new()
    }

    #[test]
    fn test_type_mapping_folds_parcel_into_lcl() {
        let rules = rules();
        assert_eq!(rules.map_type(TrackingType::Container), ShipmentType::Container);
        assert_eq!(rules.map_type(TrackingType::Parcel), ShipmentType::Lcl);
    }

    #[test]
    fn test_status_coarsening() {
        let rules = rules();
        assert_eq!(rules.map_status(CanonicalStatus::Registered), ShipmentStatus::Planned);
        assert_eq!(rules.map_status(CanonicalStatus::Delayed), ShipmentStatus::InTransit);
        assert_eq!(rules.map_status(CanonicalStatus::Exception), ShipmentStatus::InTransit);
        assert_eq!(
            rules.map_status(CanonicalStatus::CustomsCleared),
            ShipmentStatus::Arrived
        );
        assert_eq!(rules.map_status(CanonicalStatus::Delivered), ShipmentStatus::Delivered);
    }

    #[test]
    fn test_build_shipment_from_tracking() {
        let mut tracking = Tracking::new("MAEU7654321", TrackingType::Container)
            .with_carrier("MAERSK")
            .with_status(CanonicalStatus::InTransit)
            .with_route("SHANGHAI", "GENOA");
        tracking
            .metadata
            .insert("destination_country".to_string(), serde_json::json!("IT"));

        let shipment = rules().build_shipment(&tracking).unwrap();
        assert_eq!(shipment.shipment_number, "MAEU7654321");
        assert_eq!(shipment.status, ShipmentStatus::InTransit);
        assert_eq!(shipment.carrier.code, "MAERSK");
        assert_eq!(shipment.carrier.name, "Maersk Line");
        assert!(shipment.auto_created);
        assert_eq!(shipment.source_tracking_id, Some(tracking.id));
        let destination = shipment.route.destination.unwrap();
        assert_eq!(destination.name, "GENOA");
        assert_eq!(destination.country.as_deref(), Some("IT"));
    }

    #[test]
    fn test_guard_rejects_blank_number() {
        let tracking = Tracking::new("  ", TrackingType::Container);
        let result = rules().build_shipment(&tracking);
        assert!(matches!(result, Err(CargoflowError::ValidationError(_))));
    }

    #[test]
    fn test_unmapped_carrier_passes_code_through() {
        let carrier = rules().carrier_for("ACME-LINES");
        assert_eq!(carrier.code, "ACME-LINES");
        assert_eq!(carrier.name, "ACME-LINES");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let tracking = Tracking::new("MSCU1234567", TrackingType::Container)
            .with_carrier("MSC")
            .with_status(CanonicalStatus::Arrived);
        let rules = rules();
        let mut shipment = rules.build_shipment(&tracking).unwrap();

        let changed = rules.apply_to_shipment(&tracking, &mut shipment).unwrap();
        assert!(changed.is_empty(), "unexpected changes: {changed:?}");
    }

    #[test]
    fn test_apply_reports_changed_fields_only() {
        let rules = rules();
        let tracking = Tracking::new("MSCU1234567", TrackingType::Container)
            .with_carrier("MSC")
            .with_status(CanonicalStatus::InTransit);
        let mut shipment = rules.build_shipment(&tracking).unwrap();

        let updated = tracking.clone().with_status(CanonicalStatus::Delivered);
        let changed = rules.apply_to_shipment(&updated, &mut shipment).unwrap();
        assert_eq!(changed, vec!["status"]);
        assert_eq!(shipment.status, ShipmentStatus::Delivered);
    }

    #[test]
    fn test_apply_preserves_operator_fields() {
        let rules = rules();
        let tracking = Tracking::new("HLCU1234567", TrackingType::Container).with_carrier("MSC");
        let mut shipment = rules.build_shipment(&tracking).unwrap();
        shipment.carrier.service = Some("Express".to_string());
        shipment.costs.push(crate::models::CostItem {
            description: "Ocean freight".to_string(),
            amount: 900.0,
            currency: "EUR".to_string(),
        });

        let updated = tracking.clone().with_carrier("MAERSK");
        rules.apply_to_shipment(&updated, &mut shipment).unwrap();
        assert_eq!(shipment.carrier.code, "MAERSK");
        assert_eq!(shipment.carrier.service.as_deref(), Some("Express"));
        assert_eq!(shipment.costs.len(), 1);
    }

    #[test]
    fn test_reverse_covers_only_status_and_eta() {
        let rules = rules();
        let mut tracking = Tracking::new("ZIMU1234567", TrackingType::Container)
            .with_status(CanonicalStatus::InTransit)
            .with_route("HAIFA", "GENOA");

        let mut shipment = rules.build_shipment(&tracking).unwrap();
        shipment.status = ShipmentStatus::Delivered;
        shipment.schedule.eta = Some(Utc::now() + Duration::days(2));
        shipment.route.origin = Some(RoutePoint {
            name: "EDITED".to_string(),
            country: None,
        });

        let changed = rules.apply_to_tracking(&shipment, &mut tracking);
        assert_eq!(changed, vec!["status", "eta"]);
        assert_eq!(tracking.status, CanonicalStatus::Delivered);
        assert_eq!(tracking.eta, shipment.schedule.eta);
        // Route edits never flow back
        assert_eq!(tracking.origin_port.as_deref(), Some("HAIFA"));
    }

    #[test]
    fn test_reverse_skips_status_consistent_pairs() {
        let rules = rules();
        // Delayed forward-maps to in_transit; a shipment reading in_transit
        // is consistent and must not flatten the finer tracking status
        let mut tracking =
            Tracking::new("COSU1234567", TrackingType::Container).with_status(CanonicalStatus::Delayed);
        let shipment = rules.build_shipment(&tracking).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::InTransit);

        let changed = rules.apply_to_tracking(&shipment, &mut tracking);
        assert!(changed.is_empty());
        assert_eq!(tracking.status, CanonicalStatus::Delayed);
    }
}
