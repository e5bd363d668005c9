//! # Identifier Classifier
//!
//! Pure classification of raw tracking identifiers into a tracking type and
//! an optional carrier guess.
//!
//! ## Overview
//!
//! Classification is an ordered regular-expression table where the first
//! match wins; carrier guessing is a second ordered prefix table. Both tables
//! are compiled once and never mutated at runtime. The classifier performs no
//! I/O and is total: every input string yields a classification, low
//! confidence surfaces as the `UNKNOWN` carrier rather than an error.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::constants::system;
use crate::models::TrackingType;

/// Result of classifying a raw identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub tracking_type: TrackingType,
    /// Canonical carrier code, or `GENERIC`/`UNKNOWN` when nothing matched
    pub carrier_guess: String,
}

struct TypePattern {
    pattern: &'static str,
    tracking_type: TrackingType,
    regex: OnceLock<Regex>,
}

impl TypePattern {
    const fn new(pattern: &'static str, tracking_type: TrackingType) -> Self {
        Self {
            pattern,
            tracking_type,
            regex: OnceLock::new(),
        }
    }

    fn matches(&self, identifier: &str) -> bool {
        self.regex
            .get_or_init(|| Regex::new(self.pattern).expect("invalid identifier pattern"))
            .is_match(identifier)
    }
}

/// Ordered type table; first match wins. Bill-of-lading numbers share the
/// 4-letter prefix shape with containers but carry 8-12 digits, so the
/// container pattern (exactly 7 digits) must be tried first.
static TYPE_PATTERNS: [TypePattern; 3] = [
    TypePattern::new(r"^[A-Za-z]{4}\d{7}$", TrackingType::Container),
    TypePattern::new(r"^[A-Za-z]{4}\d{8,12}$", TrackingType::Bl),
    TypePattern::new(r"^\d{3}-\d{8}$", TrackingType::Awb),
];

/// Ordered carrier-prefix table consulted after the type is known.
/// Container/BL prefixes are BIC owner codes; AWB prefixes are IATA airline
/// prefixes; parcel prefixes follow courier numbering conventions.
static CARRIER_PREFIXES: &[(&str, &str)] = &[
    ("MAEU", "MAERSK"),
    ("MSKU", "MAERSK"),
    ("MRKU", "MAERSK"),
    ("MSCU", "MSC"),
    ("MEDU", "MSC"),
    ("CMAU", "CMA-CGM"),
    ("CGMU", "CMA-CGM"),
    ("COSU", "COSCO"),
    ("CSNU", "COSCO"),
    ("HLCU", "HAPAG-LLOYD"),
    ("HLXU", "HAPAG-LLOYD"),
    ("EGHU", "EVERGREEN"),
    ("EISU", "EVERGREEN"),
    ("EMCU", "EVERGREEN"),
    ("OOLU", "OOCL"),
    ("ONEU", "ONE"),
    ("ZIMU", "ZIM"),
    ("YMLU", "YANG-MING"),
    ("176-", "EMIRATES"),
    ("020-", "LUFTHANSA"),
    ("172-", "CARGOLUX"),
    ("1Z", "UPS"),
];

/// Classify a raw identifier, defaulting untyped inputs to parcel.
///
/// Pure and total: always returns a value, never fails.
pub fn classify(identifier: &str) -> Classification {
    classify_with_default(identifier, TrackingType::Parcel)
}

/// Classify a raw identifier with a call-site-specific fallback type.
///
/// Import flows that know they deal in ocean freight pass
/// [`TrackingType::Container`] so unrecognized identifiers stay in the ocean
/// pipeline instead of the parcel one.
pub fn classify_with_default(identifier: &str, fallback: TrackingType) -> Classification {
    let trimmed = identifier.trim();

    let tracking_type = TYPE_PATTERNS
        .iter()
        .find(|p| p.matches(trimmed))
        .map_or(fallback, |p| p.tracking_type);

    Classification {
        tracking_type,
        carrier_guess: guess_carrier(trimmed, tracking_type),
    }
}

fn guess_carrier(identifier: &str, tracking_type: TrackingType) -> String {
    let upper = identifier.to_ascii_uppercase();
    for (prefix, carrier) in CARRIER_PREFIXES {
        if upper.starts_with(prefix) {
            return (*carrier).to_string();
        }
    }
    // Parcel numbers without a recognizable prefix are still routable
    // through generic courier lookups; everything else is unknown.
    match tracking_type {
        TrackingType::Parcel => system::GENERIC_CARRIER.to_string(),
        _ => system::UNKNOWN_CARRIER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_classification() {
        let result = classify("MSKU1234567");
        assert_eq!(result.tracking_type, TrackingType::Container);
        assert_eq!(result.carrier_guess, "MAERSK");
    }

    #[test]
    fn test_bill_of_lading_classification() {
        let result = classify("MAEU123456789");
        assert_eq!(result.tracking_type, TrackingType::Bl);
        assert_eq!(result.carrier_guess, "MAERSK");
    }

    #[test]
    fn test_awb_classification() {
        let result = classify("176-12345678");
        assert_eq!(result.tracking_type, TrackingType::Awb);
        assert_eq!(result.carrier_guess, "EMIRATES");
    }

    #[test]
    fn test_parcel_fallback() {
        let result = classify("1Z999AA10123456784");
        assert_eq!(result.tracking_type, TrackingType::Parcel);
        assert_eq!(result.carrier_guess, "UPS");
    }

    #[test]
    fn test_unrecognized_parcel_is_generic() {
        let result = classify("ABC123");
        assert_eq!(result.tracking_type, TrackingType::Parcel);
        assert_eq!(result.carrier_guess, "GENERIC");
    }

    #[test]
    fn test_call_site_default() {
        let result = classify_with_default("not-a-real-number", TrackingType::Container);
        assert_eq!(result.tracking_type, TrackingType::Container);
        assert_eq!(result.carrier_guess, "UNKNOWN");
    }

    #[test]
    fn test_container_beats_bl_on_seven_digits() {
        // 7 digits is a container even though the BL pattern would accept 8+
        assert_eq!(
            classify("OOLU7654321").tracking_type,
            TrackingType::Container
        );
        assert_eq!(classify("OOLU76543210").tracking_type, TrackingType::Bl);
    }

    #[test]
    fn test_lowercase_identifier_still_classifies() {
        let result = classify("msku1234567");
        assert_eq!(result.tracking_type, TrackingType::Container);
        assert_eq!(result.carrier_guess, "MAERSK");
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let result = classify("  MSCU1234567  ");
        assert_eq!(result.tracking_type, TrackingType::Container);
        assert_eq!(result.carrier_guess, "MSC");
    }
}
