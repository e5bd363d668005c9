//! # Synthetic Tracking Generator
//!
//! Deterministic fallback data used when upstream is unreachable, rate
//! limited, or unconfigured. The generated record is structurally complete
//! (route, schedule, event history) so downstream code never branches on
//! "no data"; it is marked [`DataSource::Synthetic`] so consumers can still
//! tell it apart from live results.

use chrono::{Duration, Utc};
use serde_json::json;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::classification::classify_with_default;
use crate::models::{CanonicalStatus, DataSource, Tracking, TrackingEvent, TrackingType};

/// Port pool for generated routes
static PORTS: &[(&str, &str)] = &[
    ("SHANGHAI", "CN"),
    ("SINGAPORE", "SG"),
    ("ROTTERDAM", "NL"),
    ("GENOA", "IT"),
    ("LA SPEZIA", "IT"),
    ("HAMBURG", "DE"),
    ("VALENCIA", "ES"),
    ("NEW YORK", "US"),
];

/// Status pool biased toward in-flight shipments; delivery is rare so
/// repeated demo lookups keep showing movement
static STATUSES: &[CanonicalStatus] = &[
    CanonicalStatus::Registered,
    CanonicalStatus::InTransit,
    CanonicalStatus::InTransit,
    CanonicalStatus::InTransit,
    CanonicalStatus::Arrived,
    CanonicalStatus::CustomsCleared,
    CanonicalStatus::Delayed,
    CanonicalStatus::Delivered,
];

fn seed_for(identifier: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    identifier.trim().to_ascii_uppercase().hash(&mut hasher);
    hasher.finish()
}

/// Generate a deterministic, structurally valid tracking record.
///
/// The same identifier always yields the same carrier, route, and status, so
/// demo data stays stable across lookups within a session.
pub fn generate(identifier: &str, tracking_type: TrackingType) -> Tracking {
    let seed = seed_for(identifier);
    let classification = classify_with_default(identifier, tracking_type);

    let origin = PORTS[(seed % PORTS.len() as u64) as usize];
    let destination = PORTS[((seed / 7 + 3) % PORTS.len() as u64) as usize];
    let status = STATUSES[((seed / 13) % STATUSES.len() as u64) as usize];

    let now = Utc::now();
    let departed = now - Duration::days(((seed / 17) % 20 + 2) as i64);
    let eta = now + Duration::days(((seed / 23) % 30 + 1) as i64);

    let mut tracking = Tracking::new(identifier.trim().to_ascii_uppercase(), tracking_type)
        .with_carrier(classification.carrier_guess)
        .with_status(status)
        .with_route(origin.0, destination.0)
        .with_eta(eta)
        .with_data_source(DataSource::Synthetic);
    tracking.departure_date = Some(departed);

    tracking.events = history_for(status, origin.0, destination.0, departed);

    tracking
        .metadata
        .insert("origin_country".to_string(), json!(origin.1));
    tracking
        .metadata
        .insert("destination_country".to_string(), json!(destination.1));
    tracking
        .metadata
        .insert("synthetic".to_string(), json!(true));

    tracking
}

/// Build a plausible movement history ending at the current status,
/// newest first like a normalized provider payload.
fn history_for(
    status: CanonicalStatus,
    origin: &str,
    destination: &str,
    departed: chrono::DateTime<Utc>,
) -> Vec<TrackingEvent> {
    let milestones: &[(CanonicalStatus, &str, &str)] = &[
        (CanonicalStatus::Registered, "Booking confirmed", origin),
        (CanonicalStatus::InTransit, "Vessel departure", origin),
        (CanonicalStatus::Arrived, "Discharged", destination),
        (CanonicalStatus::CustomsCleared, "Released by customs", destination),
        (CanonicalStatus::Delivered, "Delivered", destination),
    ];

    let reached = match status {
        CanonicalStatus::Registered => 1,
        CanonicalStatus::InTransit | CanonicalStatus::Delayed | CanonicalStatus::Exception => 2,
        CanonicalStatus::Arrived | CanonicalStatus::OutForDelivery => 3,
        CanonicalStatus::CustomsCleared => 4,
        CanonicalStatus::Delivered => 5,
    };

    let mut events: Vec<TrackingEvent> = milestones[..reached]
        .iter()
        .enumerate()
        .map(|(i, (status, description, location))| TrackingEvent {
            date: Some(departed + Duration::days(i as i64 * 3)),
            status: *status,
            description: (*description).to_string(),
            location: Some((*location).to_string()),
        })
        .collect();
    events.reverse();
    events
}
