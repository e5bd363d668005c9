//! # Service Layer
//!
//! Orchestration services composing the classifier, normalizers, resilience
//! layer, and provider boundary into user-facing operations.

pub mod import;
pub mod tracking_service;

pub use import::{ImportRow, ImportService, ImportSummary};
pub use tracking_service::{TrackOptions, TrackingService, TypeHint};
