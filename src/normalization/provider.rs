//! # Provider Response Normalizer
//!
//! Maps a provider's heterogeneous JSON shape into the canonical tracking
//! schema.
//!
//! ## Overview
//!
//! Provider payloads differ in three ways this module absorbs:
//! - the payload may be wrapped in a single-element array
//! - field names vary per provider and are translated via a static alias table
//! - date fields arrive either as plain strings or as `{Date, IsActual}`
//!   objects
//!
//! Normalization never fails on missing optional data: absent fields become
//! sentinels, malformed event entries are skipped, and the original payload
//! is retained in `metadata` for audit. Status resolution is delegated to
//! [`crate::normalization::normalize_status`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::constants::system;
use crate::models::{DataSource, Tracking, TrackingEvent, TrackingType};
use crate::normalization::normalize_status;

/// Provider field-name aliases, canonical name first.
/// Lookup is case-sensitive on purpose: providers are consistent within
/// themselves, and a case-folding lookup would let `eta` shadow `ETA`.
static FIELD_ALIASES: &[(&str, &[&str])] = &[
    ("carrier_code", &["ShippingLine", "CarrierCode", "Carrier", "Airline"]),
    ("origin_port", &["Pol", "PortOfLoading", "Origin", "FromPort"]),
    ("destination_port", &["Pod", "PortOfDischarge", "Destination", "ToPort"]),
    ("eta", &["ETA", "EstimatedArrival", "ArrivalDate"]),
    ("departure_date", &["ETD", "DepartureDate", "FirstETD", "SailingDate"]),
    ("status", &["Status", "StatusDescription", "LastStatus", "StatusId"]),
    ("reference_number", &["ReferenceNo", "BLReferenceNo", "Reference"]),
    ("origin_country", &["FromCountry", "OriginCountry"]),
    ("destination_country", &["ToCountry", "DestinationCountry"]),
];

static EVENT_ARRAY_KEYS: &[&str] = &["Events", "Movements", "History", "TransitEvents"];

/// Normalize a raw provider payload into a canonical tracking record.
///
/// `tracking_number` and `tracking_type` come from the caller because many
/// providers echo neither back reliably.
pub fn normalize(payload: &Value, tracking_number: &str, tracking_type: TrackingType) -> Tracking {
    // Array-wrapped payloads carry the record as their first element
    let body = match payload {
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    };

    let mut tracking = Tracking::new(tracking_number, tracking_type);
    tracking.data_source = DataSource::Live;

    if let Some(carrier) = lookup_string(body, "carrier_code") {
        tracking.carrier_code = carrier.to_ascii_uppercase();
    }

    tracking.origin_port = lookup_string(body, "origin_port");
    tracking.destination_port = lookup_string(body, "destination_port");
    tracking.reference_number = lookup_string(body, "reference_number");

    let (eta, eta_is_actual) = lookup_date(body, "eta");
    tracking.eta = eta;
    let (departure, departure_is_actual) = lookup_date(body, "departure_date");
    tracking.departure_date = departure;

    let raw_status = lookup_string(body, "status").unwrap_or_default();
    tracking.status = normalize_status(&raw_status);

    tracking.events = extract_events(body);

    // Retain the original payload and derived flags for audit/debug
    tracking
        .metadata
        .insert("provider_payload".to_string(), payload.clone());
    tracking.metadata.insert(
        "raw_status".to_string(),
        Value::String(if raw_status.is_empty() {
            system::MISSING_FIELD.to_string()
        } else {
            raw_status
        }),
    );
    tracking
        .metadata
        .insert("eta_is_actual".to_string(), Value::Bool(eta_is_actual));
    tracking.metadata.insert(
        "departure_is_actual".to_string(),
        Value::Bool(departure_is_actual),
    );
    if let Some(country) = lookup_string(body, "origin_country") {
        tracking
            .metadata
            .insert("origin_country".to_string(), Value::String(country));
    }
    if let Some(country) = lookup_string(body, "destination_country") {
        tracking
            .metadata
            .insert("destination_country".to_string(), Value::String(country));
    }

    tracking
}

fn aliases_for(canonical: &str) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map_or(&[], |(_, aliases)| *aliases)
}

fn lookup_raw<'a>(body: &'a Value, canonical: &str) -> Option<&'a Value> {
    let object = body.as_object()?;
    for alias in aliases_for(canonical) {
        if let Some(value) = object.get(*alias) {
            if !value.is_null() {
                return Some(value);
            }
        }
    }
    None
}

fn lookup_string(body: &Value, canonical: &str) -> Option<String> {
    match lookup_raw(body, canonical)? {
        Value::String(s) if !s.trim().is_empty() && s != system::MISSING_FIELD => {
            Some(s.trim().to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolve a date field that may be a plain string or a `{Date, IsActual}`
/// object. Returns the parsed date and whether the provider marked it actual.
fn lookup_date(body: &Value, canonical: &str) -> (Option<DateTime<Utc>>, bool) {
    match lookup_raw(body, canonical) {
        Some(Value::String(s)) => (parse_date(s), false),
        Some(Value::Object(map)) => {
            let date = map
                .get("Date")
                .and_then(Value::as_str)
                .and_then(parse_date);
            let is_actual = map
                .get("IsActual")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            (date, is_actual)
        }
        _ => (None, false),
    }
}

/// Parse the date formats observed across providers. Returns `None` rather
/// than failing the whole normalization on an unparseable value.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == system::MISSING_FIELD {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%m/%d/%Y %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&dt));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%d/%m/%Y") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Extract and sort movement history descending by date, tolerating missing
/// or partially-shaped event arrays.
fn extract_events(body: &Value) -> Vec<TrackingEvent> {
    let Some(object) = body.as_object() else {
        return Vec::new();
    };

    let entries = EVENT_ARRAY_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_array));
    let Some(entries) = entries else {
        return Vec::new();
    };

    let mut events: Vec<TrackingEvent> = entries
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_object()?;
            let description = ["Status", "Event", "Description"]
                .iter()
                .find_map(|k| entry.get(*k).and_then(Value::as_str))?
                .trim()
                .to_string();
            let date = ["Date", "EventDate", "Timestamp"]
                .iter()
                .find_map(|k| entry.get(*k).and_then(Value::as_str))
                .and_then(parse_date);
            let location = ["Location", "Place", "Port"]
                .iter()
                .find_map(|k| entry.get(*k).and_then(Value::as_str))
                .map(|s| s.trim().to_string());
            Some(TrackingEvent {
                date,
                status: normalize_status(&description),
                description,
                location,
            })
        })
        .collect();

    // Undated events sort last so the newest dated event leads the history
    events.sort_by(|a, b| b.date.cmp(&a.date));
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CanonicalStatus;
    use serde_json::json;

    #[test]
    fn test_array_wrapped_payload_is_unwrapped() {
        let payload = json!([{
            "ShippingLine": "MAERSK",
            "Status": "Sailing",
            "Pol": "SHANGHAI",
            "Pod": "GENOA"
        }]);
        let tracking = normalize(&payload, "MAEU7654321", TrackingType::Container);
        assert_eq!(tracking.carrier_code, "MAERSK");
        assert_eq!(tracking.status, CanonicalStatus::InTransit);
        assert_eq!(tracking.origin_port.as_deref(), Some("SHANGHAI"));
        assert_eq!(tracking.destination_port.as_deref(), Some("GENOA"));
    }

    #[test]
    fn test_field_aliases_resolve() {
        let payload = json!({
            "CarrierCode": "msc",
            "PortOfLoading": "VALENCIA",
            "PortOfDischarge": "LA SPEZIA",
            "StatusDescription": "Discharged"
        });
        let tracking = normalize(&payload, "MSCU1234567", TrackingType::Container);
        assert_eq!(tracking.carrier_code, "MSC");
        assert_eq!(tracking.origin_port.as_deref(), Some("VALENCIA"));
        // Discharge is an intermediate event
        assert_eq!(tracking.status, CanonicalStatus::Arrived);
    }

    #[test]
    fn test_nested_date_object() {
        let payload = json!({
            "ETA": {"Date": "2024-03-15 08:00:00", "IsActual": true},
            "ETD": "2024-02-20"
        });
        let tracking = normalize(&payload, "HLCU1234567", TrackingType::Container);
        assert!(tracking.eta.is_some());
        assert!(tracking.departure_date.is_some());
        assert_eq!(
            tracking.metadata.get("eta_is_actual"),
            Some(&Value::Bool(true))
        );
        assert_eq!(
            tracking.metadata.get("departure_is_actual"),
            Some(&Value::Bool(false))
        );
    }

    #[test]
    fn test_missing_optional_fields_do_not_fail() {
        let tracking = normalize(&json!({}), "NOFIELDS123", TrackingType::Parcel);
        assert_eq!(tracking.tracking_number, "NOFIELDS123");
        assert_eq!(tracking.status, CanonicalStatus::Registered);
        assert!(tracking.origin_port.is_none());
        assert!(tracking.eta.is_none());
        assert_eq!(
            tracking.metadata.get("raw_status"),
            Some(&Value::String("-".to_string()))
        );
    }

    #[test]
    fn test_empty_array_payload() {
        let tracking = normalize(&json!([]), "EMPTY123", TrackingType::Parcel);
        assert_eq!(tracking.tracking_number, "EMPTY123");
        assert_eq!(tracking.status, CanonicalStatus::Registered);
    }

    #[test]
    fn test_events_sorted_descending_and_tolerant() {
        let payload = json!({
            "Events": [
                {"Date": "2024-01-10", "Status": "Gate In", "Location": "SHANGHAI"},
                {"Date": "2024-02-05", "Status": "Discharged", "Port": "GENOA"},
                {"Status": "Undated event"},
                {"malformed": true},
                42
            ]
        });
        let tracking = normalize(&payload, "COSU1234567", TrackingType::Container);
        assert_eq!(tracking.events.len(), 3);
        assert_eq!(tracking.events[0].description, "Discharged");
        assert_eq!(tracking.events[0].status, CanonicalStatus::Arrived);
        assert_eq!(tracking.events[0].location.as_deref(), Some("GENOA"));
        assert!(tracking.events[2].date.is_none());
    }

    #[test]
    fn test_original_payload_retained_in_metadata() {
        let payload = json!({"Status": "Sailing", "Extra": "kept"});
        let tracking = normalize(&payload, "ONEU1234567", TrackingType::Container);
        assert_eq!(tracking.metadata.get("provider_payload"), Some(&payload));
        assert_eq!(
            tracking.metadata.get("raw_status"),
            Some(&Value::String("Sailing".to_string()))
        );
    }

    #[test]
    fn test_sentinel_dash_treated_as_missing() {
        let payload = json!({"Pol": "-", "ETA": "-"});
        let tracking = normalize(&payload, "ZIMU1234567", TrackingType::Container);
        assert!(tracking.origin_port.is_none());
        assert!(tracking.eta.is_none());
    }
}
