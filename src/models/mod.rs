//! # Data Model Layer
//!
//! Canonical record types shared by the normalization pipeline and the sync
//! engine: tracking records as seen by carriers/providers, and business-level
//! shipment records edited independently by users.

pub mod shipment;
pub mod status;
pub mod tracking;

pub use shipment::{
    Carrier, CostItem, Product, Route, RoutePoint, Schedule, Shipment, ShipmentType,
};
pub use status::{CanonicalStatus, ShipmentStatus};
pub use tracking::{DataSource, Tracking, TrackingEvent, TrackingType};
