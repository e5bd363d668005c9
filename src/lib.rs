#![allow(clippy::doc_markdown)] // Allow technical terms like JSON, TTL in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Cargoflow Core
//!
//! Rust core for shipment-tracking normalization and bidirectional
//! tracking/shipment synchronization.
//!
//! ## Overview
//!
//! The crate ingests heterogeneous shipment-tracking records (container,
//! bill-of-lading, air-waybill, parcel) from external providers and user
//! input, normalizes vendor-specific vocabularies into one canonical model,
//! and keeps an independently-edited collection of business shipment records
//! consistent with it, without sync loops, duplicate creation, or lost
//! updates, under rate-limited and occasionally-unavailable upstream APIs.
//!
//! ## Architecture
//!
//! Data flows leaves-first through pure components into the engine:
//!
//! ```text
//! raw input / provider payload
//!        │
//!        ▼
//! Classifier / Normalizers ──▶ canonical Tracking record
//!        │                            │
//!        ▼                            ▼
//! Rate Limiter & Cache         change notification (Origin::External)
//!        │                            │
//!        ▼                            ▼
//! Tracking Service             Sync Engine queue ──▶ mapping rules
//!   (live / cache /                                   │
//!    synthetic fallback)                              ▼
//!                              Shipment create/update + tagged
//!                              notification (Origin::AutoSync, dropped
//!                              on re-entry, no cycles)
//! ```
//!
//! ## Module Organization
//!
//! - [`models`] - Canonical tracking and shipment record types
//! - [`classification`] - Pure identifier classifier (type + carrier guess)
//! - [`normalization`] - Status taxonomy and provider payload normalizers
//! - [`resilience`] - Per-provider rate limiter and lookup cache
//! - [`provider`] - Provider adapter contract and synthetic fallback
//! - [`services`] - Tracking lookup orchestration and import ingestion
//! - [`events`] - Notification bus with typed origin tags
//! - [`persistence`] - Storage collaborator trait and in-memory store
//! - [`sync`] - The reconciliation engine, mapping rules, and orphan scan
//! - [`config`] - Environment-driven configuration
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cargoflow_core::config::CargoflowConfig;
//! use cargoflow_core::events::EventBus;
//! use cargoflow_core::persistence::InMemoryStore;
//! use cargoflow_core::sync::{SyncEngine, SyncEngineConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CargoflowConfig::from_env()?;
//! let store = Arc::new(InMemoryStore::new());
//! let bus = EventBus::new(config.event_channel_capacity);
//!
//! let engine = SyncEngine::new(store, bus.clone(), SyncEngineConfig::from(&config));
//! let report = engine.reconcile().await?;
//! println!("{} orphaned trackings", report.orphans.len());
//! engine.run().await;
//! # Ok(())
//! # }
//! ```

pub mod classification;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod normalization;
pub mod persistence;
pub mod provider;
pub mod resilience;
pub mod services;
pub mod sync;

pub use config::CargoflowConfig;
pub use error::{CargoflowError, Result};
pub use events::{EventBus, Notification, Origin};
pub use models::{
    CanonicalStatus, DataSource, Shipment, ShipmentStatus, ShipmentType, Tracking, TrackingType,
};
pub use sync::{SyncEngine, SyncEngineConfig, SyncEngineStats};
