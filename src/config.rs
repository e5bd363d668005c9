use crate::constants::system;
use crate::error::{CargoflowError, Result};
use std::collections::HashMap;

/// Top-level configuration for the tracking core.
///
/// Values come from `Default` with environment overrides via [`CargoflowConfig::from_env`].
/// Provider credentials are supplied here, never hard-coded in adapters.
#[derive(Debug, Clone)]
pub struct CargoflowConfig {
    /// API key for the tracking data provider; `None` means synthetic mode
    pub provider_api_key: Option<String>,
    /// Provider identifier used for rate-limit bookkeeping
    pub provider_key: String,
    /// Maximum provider requests per rate-limit window
    pub rate_limit_max_requests: u32,
    /// Rate-limit window length in seconds
    pub rate_limit_window_secs: u64,
    /// Lookup cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Tracking changes processed per sync batch
    pub sync_batch_size: usize,
    /// Pause between sync batches in milliseconds
    pub batch_pause_ms: u64,
    /// Event bus channel capacity
    pub event_channel_capacity: usize,
    pub custom_settings: HashMap<String, String>,
}

impl Default for CargoflowConfig {
    fn default() -> Self {
        Self {
            provider_api_key: None,
            provider_key: "shipsgo".to_string(),
            rate_limit_max_requests: system::DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            rate_limit_window_secs: system::DEFAULT_RATE_LIMIT_WINDOW_SECS,
            cache_ttl_secs: system::DEFAULT_CACHE_TTL_SECS,
            sync_batch_size: system::DEFAULT_SYNC_BATCH_SIZE,
            batch_pause_ms: system::DEFAULT_BATCH_PAUSE_MS,
            event_channel_capacity: 1000,
            custom_settings: HashMap::new(),
        }
    }
}

impl CargoflowConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(api_key) = std::env::var("CARGOFLOW_PROVIDER_API_KEY") {
            if !api_key.is_empty() {
                config.provider_api_key = Some(api_key);
            }
        }

        if let Ok(provider) = std::env::var("CARGOFLOW_PROVIDER_KEY") {
            config.provider_key = provider;
        }

        if let Ok(max_requests) = std::env::var("CARGOFLOW_RATE_LIMIT_MAX_REQUESTS") {
            config.rate_limit_max_requests = max_requests.parse().map_err(|e| {
                CargoflowError::ConfigurationError(format!("Invalid rate_limit_max_requests: {e}"))
            })?;
        }

        if let Ok(window) = std::env::var("CARGOFLOW_RATE_LIMIT_WINDOW_SECS") {
            config.rate_limit_window_secs = window.parse().map_err(|e| {
                CargoflowError::ConfigurationError(format!("Invalid rate_limit_window_secs: {e}"))
            })?;
        }

        if let Ok(ttl) = std::env::var("CARGOFLOW_CACHE_TTL_SECS") {
            config.cache_ttl_secs = ttl.parse().map_err(|e| {
                CargoflowError::ConfigurationError(format!("Invalid cache_ttl_secs: {e}"))
            })?;
        }

        if let Ok(batch_size) = std::env::var("CARGOFLOW_SYNC_BATCH_SIZE") {
            config.sync_batch_size = batch_size.parse().map_err(|e| {
                CargoflowError::ConfigurationError(format!("Invalid sync_batch_size: {e}"))
            })?;
        }

        if let Ok(pause) = std::env::var("CARGOFLOW_BATCH_PAUSE_MS") {
            config.batch_pause_ms = pause.parse().map_err(|e| {
                CargoflowError::ConfigurationError(format!("Invalid batch_pause_ms: {e}"))
            })?;
        }

        Ok(config)
    }

    /// Whether a live provider can be called at all
    pub fn live_mode(&self) -> bool {
        self.provider_api_key.is_some()
    }
}
