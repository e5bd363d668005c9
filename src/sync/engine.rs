//! # Sync Engine
//!
//! Keeps the tracking and shipment collections consistent in both directions
//! without feedback loops, duplicate creation, or lost updates.
//!
//! ## Overview
//!
//! The engine subscribes to change notifications, converts them into queue
//! items, and drains one internal FIFO queue cooperatively: items are
//! processed one at a time by a single logical worker, with a short pause
//! between batches so downstream listeners (UI re-render, storage writes)
//! are not overwhelmed by bulk imports.
//!
//! ## Cycle prevention
//!
//! Every notification the engine emits is tagged [`Origin::AutoSync`]; the
//! engine drops its own tagged notifications on receipt. This is the single
//! most important correctness property of the design: without it a
//! tracking update would trigger a shipment update would trigger a tracking
//! update, indefinitely.
//!
//! ## Failure policy
//!
//! The engine retries nothing. A queue item that fails validation or
//! persistence is logged and the next item proceeds; provider failures never
//! reach the engine at all (the tracking service absorbs them).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::CargoflowConfig;
use crate::constants::{system, topics};
use crate::error::{CargoflowError, Result};
use crate::events::{EventBus, Notification, Origin};
use crate::models::{Shipment, Tracking};
use crate::persistence::RecordStore;
use crate::sync::mapping::MappingRules;
use crate::sync::queue::{SyncItemKind, SyncQueueItem};
use crate::sync::reconciliation::{self, ReconciliationReport};

/// Engine tuning knobs
#[derive(Debug, Clone)]
pub struct SyncEngineConfig {
    /// Queue items processed before pausing
    pub batch_size: usize,
    /// Pause between batches
    pub batch_pause: Duration,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            batch_size: system::DEFAULT_SYNC_BATCH_SIZE,
            batch_pause: Duration::from_millis(system::DEFAULT_BATCH_PAUSE_MS),
        }
    }
}

impl From<&CargoflowConfig> for SyncEngineConfig {
    fn from(config: &CargoflowConfig) -> Self {
        Self {
            batch_size: config.sync_batch_size,
            batch_pause: Duration::from_millis(config.batch_pause_ms),
        }
    }
}

/// Point-in-time engine counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncEngineStats {
    pub items_processed: u64,
    pub shipments_created: u64,
    pub shipments_updated: u64,
    pub trackings_updated: u64,
    pub own_notifications_dropped: u64,
    pub validation_failures: u64,
    pub duplicate_links_observed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    items_processed: AtomicU64,
    shipments_created: AtomicU64,
    shipments_updated: AtomicU64,
    trackings_updated: AtomicU64,
    own_notifications_dropped: AtomicU64,
    validation_failures: AtomicU64,
    duplicate_links_observed: AtomicU64,
}

/// Bidirectional reconciliation engine between the tracking and shipment
/// collections.
pub struct SyncEngine {
    store: Arc<dyn RecordStore>,
    bus: EventBus,
    rules: MappingRules,
    config: SyncEngineConfig,
    /// FIFO work queue; the drain lock enforces the single-worker model
    queue: Mutex<VecDeque<SyncQueueItem>>,
    drain_lock: Mutex<()>,
    counters: Counters,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn RecordStore>, bus: EventBus, config: SyncEngineConfig) -> Self {
        Self {
            store,
            bus,
            rules: MappingRules::new(),
            config,
            queue: Mutex::new(VecDeque::new()),
            drain_lock: Mutex::new(()),
            counters: Counters::default(),
        }
    }

    /// Scan both collections once and report inconsistencies.
    ///
    /// Orphans are reported, not auto-created; batch creation is the
    /// separate, operator-confirmed [`SyncEngine::auto_create_orphans`].
    pub async fn reconcile(&self) -> Result<ReconciliationReport> {
        let trackings = self.store.list_trackings().await?;
        let shipments = self.store.list_shipments().await?;
        let report = reconciliation::scan(&trackings, &shipments);

        info!(
            orphans = report.orphans.len(),
            duplicate_links = report.duplicate_links.len(),
            trackings = report.scanned_trackings,
            shipments = report.scanned_shipments,
            "Startup reconciliation scan complete"
        );
        for duplicate in &report.duplicate_links {
            warn!(
                tracking_number = %duplicate.tracking_number,
                shipments = duplicate.shipment_ids.len(),
                "Multiple shipments share one tracking number"
            );
        }
        Ok(report)
    }

    /// Create shipments for the given orphaned tracking numbers, in bounded
    /// batches. Numbers with no tracking record are skipped.
    pub async fn auto_create_orphans(&self, tracking_numbers: &[String]) -> Result<usize> {
        let trackings = self.store.list_trackings().await?;
        let mut enqueued = 0usize;

        for number in tracking_numbers {
            let found = trackings
                .iter()
                .find(|t| t.tracking_number.eq_ignore_ascii_case(number));
            match found {
                Some(tracking) => {
                    self.enqueue(SyncQueueItem::new(
                        SyncItemKind::TrackingChanged,
                        serde_json::to_value(tracking)
                            .map_err(|e| CargoflowError::ValidationError(e.to_string()))?,
                    ))
                    .await;
                    enqueued += 1;
                }
                None => warn!(
                    tracking_number = %number,
                    "Orphan auto-create skipped, no such tracking"
                ),
            }
        }

        self.drain().await;
        Ok(enqueued)
    }

    /// Feed one notification into the engine.
    ///
    /// Engine-emitted notifications are dropped here; everything else is
    /// enqueued and the queue is drained to completion before returning.
    pub async fn handle_notification(&self, notification: &Notification) -> Result<()> {
        if notification.is_auto_sync() {
            self.counters
                .own_notifications_dropped
                .fetch_add(1, Ordering::Relaxed);
            debug!(topic = %notification.topic, "Dropping engine-emitted notification");
            return Ok(());
        }

        match notification.topic.as_str() {
            topics::TRACKINGS_UPDATED | topics::TRACKING_ADDED => {
                self.enqueue(SyncQueueItem::new(
                    SyncItemKind::TrackingChanged,
                    notification.payload.clone(),
                ))
                .await;
            }
            topics::TRACKING_IMPORTED => {
                self.enqueue_imported(&notification.payload).await?;
            }
            topics::SHIPMENTS_UPDATED => {
                self.enqueue(SyncQueueItem::new(
                    SyncItemKind::ShipmentChanged,
                    notification.payload.clone(),
                ))
                .await;
            }
            other => {
                debug!(topic = other, "Ignoring notification on unmapped topic");
            }
        }

        self.drain().await;
        Ok(())
    }

    /// Run the engine against the bus until the channel closes.
    pub async fn run(&self) {
        let mut receiver = self.bus.subscribe();
        info!("Sync engine listening for notifications");
        loop {
            match receiver.recv().await {
                Ok(notification) => {
                    if let Err(e) = self.handle_notification(&notification).await {
                        error!(error = %e, topic = %notification.topic, "Notification handling failed");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Sync engine lagged behind the notification bus");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Notification bus closed, sync engine stopping");
                    break;
                }
            }
        }
    }

    pub fn stats(&self) -> SyncEngineStats {
        SyncEngineStats {
            items_processed: self.counters.items_processed.load(Ordering::Relaxed),
            shipments_created: self.counters.shipments_created.load(Ordering::Relaxed),
            shipments_updated: self.counters.shipments_updated.load(Ordering::Relaxed),
            trackings_updated: self.counters.trackings_updated.load(Ordering::Relaxed),
            own_notifications_dropped: self
                .counters
                .own_notifications_dropped
                .load(Ordering::Relaxed),
            validation_failures: self.counters.validation_failures.load(Ordering::Relaxed),
            duplicate_links_observed: self
                .counters
                .duplicate_links_observed
                .load(Ordering::Relaxed),
        }
    }

    async fn enqueue(&self, item: SyncQueueItem) {
        self.queue.lock().await.push_back(item);
    }

    /// Expand a bulk-import notification into one queue item per imported
    /// tracking record.
    async fn enqueue_imported(&self, payload: &serde_json::Value) -> Result<()> {
        let numbers: Vec<String> = payload
            .get("tracking_numbers")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();
        if numbers.is_empty() {
            warn!("Import notification carried no tracking numbers");
            return Ok(());
        }

        let trackings = self.store.list_trackings().await?;
        for number in &numbers {
            if let Some(tracking) = trackings
                .iter()
                .find(|t| t.tracking_number.eq_ignore_ascii_case(number))
            {
                self.enqueue(SyncQueueItem::new(
                    SyncItemKind::TrackingChanged,
                    serde_json::to_value(tracking)
                        .map_err(|e| CargoflowError::ValidationError(e.to_string()))?,
                ))
                .await;
            }
        }
        debug!(count = numbers.len(), "Import batch expanded onto sync queue");
        Ok(())
    }

    /// Drain the queue to empty, one item at a time, pausing between
    /// batches. The drain lock keeps this a single logical worker even when
    /// notifications arrive from several tasks.
    async fn drain(&self) {
        let _guard = self.drain_lock.lock().await;
        let mut processed_in_batch = 0usize;

        loop {
            let item = self.queue.lock().await.pop_front();
            let Some(item) = item else { break };

            if let Err(e) = self.process_item(&item).await {
                match &e {
                    CargoflowError::ValidationError(_) => {
                        self.counters
                            .validation_failures
                            .fetch_add(1, Ordering::Relaxed);
                        warn!(error = %e, "Sync item rejected");
                    }
                    _ => error!(error = %e, "Sync item failed"),
                }
            }
            self.counters.items_processed.fetch_add(1, Ordering::Relaxed);

            processed_in_batch += 1;
            if processed_in_batch >= self.config.batch_size {
                processed_in_batch = 0;
                let more_pending = !self.queue.lock().await.is_empty();
                if more_pending && !self.config.batch_pause.is_zero() {
                    tokio::time::sleep(self.config.batch_pause).await;
                }
            }
        }
    }

    async fn process_item(&self, item: &SyncQueueItem) -> Result<()> {
        match item.kind {
            SyncItemKind::TrackingChanged => {
                let tracking: Tracking =
                    serde_json::from_value(item.payload.clone()).map_err(|e| {
                        CargoflowError::ValidationError(format!(
                            "Tracking payload failed validation: {e}"
                        ))
                    })?;
                self.apply_tracking_change(tracking).await
            }
            SyncItemKind::ShipmentChanged => {
                let shipment: Shipment =
                    serde_json::from_value(item.payload.clone()).map_err(|e| {
                        CargoflowError::ValidationError(format!(
                            "Shipment payload failed validation: {e}"
                        ))
                    })?;
                self.apply_shipment_change(shipment).await
            }
        }
    }

    /// Forward propagation: tracking change → linked shipment.
    async fn apply_tracking_change(&self, tracking: Tracking) -> Result<()> {
        self.rules.guard(&tracking)?;

        let mut shipments = self.store.list_shipments().await?;
        let mut linked: Vec<usize> = shipments
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                s.tracking_number
                    .eq_ignore_ascii_case(&tracking.tracking_number)
            })
            .map(|(i, _)| i)
            .collect();

        if linked.is_empty() {
            let shipment = self.rules.build_shipment(&tracking)?;
            info!(
                tracking_number = %tracking.tracking_number,
                shipment_id = %shipment.id,
                "Auto-creating shipment for tracking"
            );
            let payload = serde_json::to_value(&shipment)
                .map_err(|e| CargoflowError::EventError(e.to_string()))?;
            shipments.push(shipment);
            self.store.save_shipments(shipments).await?;
            self.counters
                .shipments_created
                .fetch_add(1, Ordering::Relaxed);
            self.publish_auto(topics::SHIPMENTS_UPDATED, payload)?;
            return Ok(());
        }

        if linked.len() > 1 {
            self.counters
                .duplicate_links_observed
                .fetch_add(1, Ordering::Relaxed);
            warn!(
                tracking_number = %tracking.tracking_number,
                count = linked.len(),
                "Multiple shipments share this tracking number, updating the oldest"
            );
            linked.sort_by_key(|&i| shipments[i].created_at);
        }

        let index = linked[0];
        let changed = self
            .rules
            .apply_to_shipment(&tracking, &mut shipments[index])?;
        if changed.is_empty() {
            debug!(
                tracking_number = %tracking.tracking_number,
                "Linked shipment already consistent"
            );
            return Ok(());
        }

        let shipment = &mut shipments[index];
        shipment.last_sync_at = Some(chrono::Utc::now());
        shipment.touch();
        info!(
            tracking_number = %tracking.tracking_number,
            shipment_id = %shipment.id,
            fields = ?changed,
            "Propagated tracking change to shipment"
        );
        let payload = serde_json::to_value(&*shipment)
            .map_err(|e| CargoflowError::EventError(e.to_string()))?;
        self.store.save_shipments(shipments).await?;
        self.counters
            .shipments_updated
            .fetch_add(1, Ordering::Relaxed);
        self.publish_auto(topics::SHIPMENTS_UPDATED, payload)?;
        Ok(())
    }

    /// Reverse propagation: external shipment edit → linked tracking.
    /// Only status and eta flow back.
    async fn apply_shipment_change(&self, shipment: Shipment) -> Result<()> {
        let mut trackings = self.store.list_trackings().await?;
        let Some(index) = trackings
            .iter()
            .position(|t| t.tracking_number.eq_ignore_ascii_case(&shipment.tracking_number))
        else {
            debug!(
                tracking_number = %shipment.tracking_number,
                "Shipment has no linked tracking, nothing to propagate"
            );
            return Ok(());
        };

        let changed = self.rules.apply_to_tracking(&shipment, &mut trackings[index]);
        if changed.is_empty() {
            return Ok(());
        }

        let tracking = &mut trackings[index];
        tracking.touch();
        info!(
            tracking_number = %tracking.tracking_number,
            fields = ?changed,
            "Propagated shipment edit back to tracking"
        );
        let payload = serde_json::to_value(&*tracking)
            .map_err(|e| CargoflowError::EventError(e.to_string()))?;
        self.store.save_trackings(trackings).await?;
        self.counters
            .trackings_updated
            .fetch_add(1, Ordering::Relaxed);
        self.publish_auto(topics::TRACKINGS_UPDATED, payload)?;
        Ok(())
    }

    fn publish_auto(&self, topic: &str, payload: serde_json::Value) -> Result<()> {
        self.bus
            .publish(topic, payload, Origin::AutoSync)
            .map_err(|e| CargoflowError::EventError(e.to_string()))
    }
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
