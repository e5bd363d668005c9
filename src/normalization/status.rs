//! # Status Taxonomy Normalizer
//!
//! Maps any provider/locale status string onto the canonical status set.
//!
//! ## Resolution order
//!
//! 1. Exact vocabulary-table hit
//! 2. Case-insensitive table hit
//! 3. Substring heuristics
//! 4. Default to `registered`
//!
//! The vocabulary table is built once and never mutated. `"Discharged"` is a
//! first-class table entry mapping to `arrived`: discharge from a vessel is an
//! intermediate event, and routing it through the substring fallback has
//! historically produced premature delivered notifications.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::models::CanonicalStatus;

/// Provider/locale vocabulary, including Italian synonyms and IATA cargo
/// event codes. Keys are stored lowercase; exact-case hits are resolved
/// against the raw key first.
static VOCABULARY: &[(&str, CanonicalStatus)] = &[
    // Registration and booking
    ("registered", CanonicalStatus::Registered),
    ("booking confirmed", CanonicalStatus::Registered),
    ("booked", CanonicalStatus::Registered),
    ("pending", CanonicalStatus::Registered),
    ("label created", CanonicalStatus::Registered),
    ("info received", CanonicalStatus::Registered),
    ("registrato", CanonicalStatus::Registered),
    ("presa in carico", CanonicalStatus::Registered),
    ("rcs", CanonicalStatus::Registered),
    // Movement
    ("in transit", CanonicalStatus::InTransit),
    ("sailing", CanonicalStatus::InTransit),
    ("loaded", CanonicalStatus::InTransit),
    ("loaded on vessel", CanonicalStatus::InTransit),
    ("vessel departure", CanonicalStatus::InTransit),
    ("departed", CanonicalStatus::InTransit),
    ("gate in", CanonicalStatus::InTransit),
    ("shipment picked up", CanonicalStatus::InTransit),
    ("in transito", CanonicalStatus::InTransit),
    ("partito", CanonicalStatus::InTransit),
    ("spedito", CanonicalStatus::InTransit),
    ("in viaggio", CanonicalStatus::InTransit),
    ("dep", CanonicalStatus::InTransit),
    ("fwb", CanonicalStatus::InTransit),
    // Arrival. "Discharged" stays an intermediate event, never delivered.
    ("discharged", CanonicalStatus::Arrived),
    ("vessel arrival", CanonicalStatus::Arrived),
    ("arrived", CanonicalStatus::Arrived),
    ("at destination port", CanonicalStatus::Arrived),
    ("arrivato", CanonicalStatus::Arrived),
    ("arrivata", CanonicalStatus::Arrived),
    ("scaricato", CanonicalStatus::Arrived),
    ("arr", CanonicalStatus::Arrived),
    ("rcf", CanonicalStatus::Arrived),
    // Final mile
    ("out for delivery", CanonicalStatus::OutForDelivery),
    ("with delivery courier", CanonicalStatus::OutForDelivery),
    ("in consegna", CanonicalStatus::OutForDelivery),
    ("ofd", CanonicalStatus::OutForDelivery),
    // Customs
    ("customs clearance", CanonicalStatus::CustomsCleared),
    ("customs cleared", CanonicalStatus::CustomsCleared),
    ("released by customs", CanonicalStatus::CustomsCleared),
    ("sdoganato", CanonicalStatus::CustomsCleared),
    ("in dogana", CanonicalStatus::CustomsCleared),
    ("ccd", CanonicalStatus::CustomsCleared),
    // Completion
    ("delivered", CanonicalStatus::Delivered),
    ("proof of delivery", CanonicalStatus::Delivered),
    ("consegnato", CanonicalStatus::Delivered),
    ("consegnata", CanonicalStatus::Delivered),
    ("dlv", CanonicalStatus::Delivered),
    ("pod", CanonicalStatus::Delivered),
    // Trouble
    ("delayed", CanonicalStatus::Delayed),
    ("rolled", CanonicalStatus::Delayed),
    ("in ritardo", CanonicalStatus::Delayed),
    ("exception", CanonicalStatus::Exception),
    ("on hold", CanonicalStatus::Exception),
    ("held", CanonicalStatus::Exception),
    ("failed delivery attempt", CanonicalStatus::Exception),
    ("returned to sender", CanonicalStatus::Exception),
    ("giacenza", CanonicalStatus::Exception),
    ("hld", CanonicalStatus::Exception),
];

fn vocabulary_table() -> &'static HashMap<&'static str, CanonicalStatus> {
    static TABLE: OnceLock<HashMap<&'static str, CanonicalStatus>> = OnceLock::new();
    TABLE.get_or_init(|| VOCABULARY.iter().copied().collect())
}

/// Normalize a raw provider/locale status string.
///
/// Pure and total: same input always yields the same output, unknown inputs
/// fall through to `registered`.
pub fn normalize_status(raw: &str) -> CanonicalStatus {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CanonicalStatus::Registered;
    }

    let table = vocabulary_table();

    // Exact hit, then case-insensitive hit
    if let Some(status) = table.get(trimmed) {
        return *status;
    }
    let lower = trimmed.to_lowercase();
    if let Some(status) = table.get(lower.as_str()) {
        return *status;
    }

    // Substring heuristics, checked against the lowercased input.
    // "delivered"/"consegn" must run before "arriv": provider strings like
    // "Arrived at delivery depot, delivered" should resolve as delivered.
    if lower.contains("transit") {
        CanonicalStatus::InTransit
    } else if lower.contains("delivered") || lower.contains("consegn") {
        CanonicalStatus::Delivered
    } else if lower.contains("arriv") {
        CanonicalStatus::Arrived
    } else if lower.contains("custom") || lower.contains("dogan") {
        CanonicalStatus::CustomsCleared
    } else if lower.contains("depart") || lower.contains("partit") {
        CanonicalStatus::InTransit
    } else {
        CanonicalStatus::Registered
    }
}
