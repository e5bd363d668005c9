//! # Sync Engine
//!
//! Bidirectional reconciliation between the tracking and shipment
//! collections: declarative field mapping, a single-worker FIFO queue,
//! cycle-safe notification handling, and startup orphan reconciliation.

pub mod engine;
pub mod mapping;
pub mod queue;
pub mod reconciliation;

pub use engine::{SyncEngine, SyncEngineConfig, SyncEngineStats};
pub use mapping::MappingRules;
pub use queue::{SyncItemKind, SyncQueueItem};
pub use reconciliation::{DuplicateLinkReport, OrphanReport, ReconciliationReport};
