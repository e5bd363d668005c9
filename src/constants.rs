//! # System Constants
//!
//! Core constants and type groups that define the operational boundaries of
//! the tracking/shipment synchronization system.

// Re-export status types for convenience
pub use crate::models::{CanonicalStatus, ShipmentStatus};

/// Notification topics published on the event bus
pub mod topics {
    /// A tracking record was mutated (provider refresh or reverse sync)
    pub const TRACKINGS_UPDATED: &str = "trackings_updated";
    /// A single tracking record was created by manual entry
    pub const TRACKING_ADDED: &str = "tracking_added";
    /// A batch of tracking records arrived through the import pipeline
    pub const TRACKING_IMPORTED: &str = "tracking_imported";
    /// A shipment record was created or mutated
    pub const SHIPMENTS_UPDATED: &str = "shipments_updated";
}

/// System-wide sentinel values and defaults
pub mod system {
    /// Carrier code used when classification produced no confident match
    pub const UNKNOWN_CARRIER: &str = "UNKNOWN";

    /// Carrier code used for parcel identifiers with no recognizable prefix
    pub const GENERIC_CARRIER: &str = "GENERIC";

    /// Sentinel for absent free-text provider fields
    pub const MISSING_FIELD: &str = "-";

    /// Current core version
    pub const CARGOFLOW_CORE_VERSION: &str = "0.1.0";

    /// Number of tracking changes processed per sync batch
    pub const DEFAULT_SYNC_BATCH_SIZE: usize = 10;

    /// Pause between sync batches to avoid overwhelming downstream listeners
    pub const DEFAULT_BATCH_PAUSE_MS: u64 = 250;

    /// Default per-provider request budget per window
    pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 100;

    /// Default rate-limit window length in seconds
    pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

    /// Default lookup cache TTL in seconds
    pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
}

/// Canonical carrier code to display-name lookups used by the mapping rules
pub mod carriers {
    /// Ocean and air carrier display names, keyed by canonical code.
    /// Immutable; consulted through `MappingRules`, never mutated at runtime.
    pub const CARRIER_NAMES: &[(&str, &str)] = &[
        ("MAERSK", "Maersk Line"),
        ("MSC", "Mediterranean Shipping Company"),
        ("CMA-CGM", "CMA CGM Group"),
        ("COSCO", "COSCO Shipping Lines"),
        ("HAPAG-LLOYD", "Hapag-Lloyd AG"),
        ("EVERGREEN", "Evergreen Marine"),
        ("OOCL", "Orient Overseas Container Line"),
        ("ONE", "Ocean Network Express"),
        ("ZIM", "ZIM Integrated Shipping"),
        ("YANG-MING", "Yang Ming Marine Transport"),
        ("EMIRATES", "Emirates SkyCargo"),
        ("LUFTHANSA", "Lufthansa Cargo"),
        ("CARGOLUX", "Cargolux Airlines"),
        ("UPS", "United Parcel Service"),
        ("FEDEX", "FedEx Express"),
        ("DHL", "DHL Express"),
        ("GLS", "General Logistics Systems"),
        ("BRT", "BRT Corriere Espresso"),
    ];
}

/// Status groupings used by the sync engine and reporting
pub mod status_groups {
    use crate::models::CanonicalStatus;

    /// Statuses describing a unit that is still moving toward delivery
    pub const ACTIVE_STATUSES: &[CanonicalStatus] = &[
        CanonicalStatus::Registered,
        CanonicalStatus::InTransit,
        CanonicalStatus::Arrived,
        CanonicalStatus::OutForDelivery,
        CanonicalStatus::CustomsCleared,
    ];

    /// Statuses after which no further provider polling is useful
    pub const TERMINAL_STATUSES: &[CanonicalStatus] = &[CanonicalStatus::Delivered];

    /// Statuses that should surface in exception dashboards
    pub const ATTENTION_STATUSES: &[CanonicalStatus] =
        &[CanonicalStatus::Delayed, CanonicalStatus::Exception];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalStatus;

    #[test]
    fn test_status_groups_are_disjoint() {
        for status in status_groups::ACTIVE_STATUSES {
            assert!(!status_groups::TERMINAL_STATUSES.contains(status));
            assert!(!status_groups::ATTENTION_STATUSES.contains(status));
        }
    }

    #[test]
    fn test_every_status_belongs_to_a_group() {
        let all = [
            CanonicalStatus::Registered,
            CanonicalStatus::InTransit,
            CanonicalStatus::Arrived,
            CanonicalStatus::OutForDelivery,
            CanonicalStatus::CustomsCleared,
            CanonicalStatus::Delivered,
            CanonicalStatus::Delayed,
            CanonicalStatus::Exception,
        ];
        for status in all {
            let grouped = status_groups::ACTIVE_STATUSES.contains(&status)
                || status_groups::TERMINAL_STATUSES.contains(&status)
                || status_groups::ATTENTION_STATUSES.contains(&status);
            assert!(grouped, "{status} has no group");
        }
    }
}
