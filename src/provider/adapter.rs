//! # Provider Adapter Contract
//!
//! Boundary to the external tracking data vendor. All wire-level detail
//! (HTTP, authentication headers, polling cadence) lives behind this trait;
//! the core never sees a network error that isn't already wrapped in
//! [`ProviderError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response to registering a shipment with the provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddShipmentResponse {
    /// Provider-assigned handle for subsequent lookups, when the provider
    /// uses a two-step register-then-query flow
    pub request_id: Option<String>,
}

/// Errors surfaced by provider adapters
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider authentication failed: {0}")]
    Authentication(String),

    #[error("Provider returned an unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Provider has no credentials configured")]
    NotConfigured,

    #[error("Tracking identifier not found upstream: {0}")]
    NotFound(String),
}

/// External collaborator performing actual calls to a tracking data vendor.
///
/// Credentials come from configuration; an adapter without credentials
/// reports `is_configured() == false` and the tracking service never calls
/// it.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable key identifying this provider for rate-limit bookkeeping
    fn provider_key(&self) -> &str;

    /// Whether credentials are configured and live calls are possible
    fn is_configured(&self) -> bool;

    /// Register a shipment for tracking with the provider
    async fn add_shipment(&self, identifier: &str) -> Result<AddShipmentResponse, ProviderError>;

    /// Fetch the raw provider payload for an identifier or request handle
    async fn get_shipment_info(&self, identifier: &str) -> Result<Value, ProviderError>;
}
