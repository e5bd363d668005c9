//! # Tracking Service
//!
//! Orchestrates classification, caching, rate limiting, provider calls, and
//! synthetic fallback behind a single `track` entry point.
//!
//! ## Fallback policy
//!
//! A lookup always succeeds. Provider errors, missing credentials, and an
//! exhausted rate budget all degrade to the deterministic synthetic
//! generator, so the sync engine and UI never observe a provider failure;
//! they only see where the data came from via [`DataSource`].

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classification::classify;
use crate::config::CargoflowConfig;
use crate::models::{Tracking, TrackingType};
use crate::normalization;
use crate::provider::{synthetic, ProviderAdapter};
use crate::resilience::{cache_key, CacheConfig, RateLimiter, RateLimiterConfig, TrackingCache};
use std::time::Duration;

/// Caller-supplied type hint for a lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeHint {
    /// Resolve the type through the identifier classifier
    #[default]
    Auto,
    /// Caller already knows the type (e.g. an import column said so)
    Known(TrackingType),
}

/// Per-call options
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackOptions {
    /// Skip the cache and force a fresh lookup
    pub force_refresh: bool,
}

pub struct TrackingService {
    config: CargoflowConfig,
    adapter: Option<Arc<dyn ProviderAdapter>>,
    cache: TrackingCache,
    rate_limiter: RateLimiter,
}

impl TrackingService {
    pub fn new(config: CargoflowConfig, adapter: Option<Arc<dyn ProviderAdapter>>) -> Self {
        let cache = TrackingCache::new(CacheConfig {
            ttl: Duration::from_secs(config.cache_ttl_secs),
        });
        let rate_limiter = RateLimiter::new(RateLimiterConfig {
            max_requests: config.rate_limit_max_requests,
            window: Duration::from_secs(config.rate_limit_window_secs),
        });
        Self {
            config,
            adapter,
            cache,
            rate_limiter,
        }
    }

    /// Answer a tracking lookup. Never fails; the result's `data_source`
    /// says whether it is live, cached, or synthetic.
    pub async fn track(&self, identifier: &str, hint: TypeHint, opts: TrackOptions) -> Tracking {
        let tracking_type = match hint {
            TypeHint::Known(t) => t,
            TypeHint::Auto => classify(identifier).tracking_type,
        };

        let key = cache_key(identifier, tracking_type);
        if !opts.force_refresh {
            if let Some(cached) = self.cache.get(&key) {
                return cached;
            }
        }

        if let Some(live) = self.try_live_lookup(identifier, tracking_type).await {
            self.cache.put(key, live.clone());
            return live;
        }

        debug!(
            identifier,
            %tracking_type,
            "Falling back to synthetic tracking data"
        );
        synthetic::generate(identifier, tracking_type)
    }

    /// Register a shipment with the provider ahead of polling.
    ///
    /// Best-effort: failures are logged and swallowed, the subsequent lookup
    /// will fall back to synthetic data on its own.
    pub async fn register(&self, identifier: &str) -> Option<String> {
        let adapter = self.adapter.as_ref()?;
        if !self.live_calls_possible(adapter.as_ref()) {
            return None;
        }
        if !self.rate_limiter.allow(adapter.provider_key()) {
            return None;
        }
        match adapter.add_shipment(identifier).await {
            Ok(response) => response.request_id,
            Err(e) => {
                warn!(identifier, error = %e, "Provider registration failed");
                None
            }
        }
    }

    async fn try_live_lookup(
        &self,
        identifier: &str,
        tracking_type: TrackingType,
    ) -> Option<Tracking> {
        let adapter = self.adapter.as_ref()?;
        if !self.live_calls_possible(adapter.as_ref()) {
            return None;
        }
        if !self.rate_limiter.allow(adapter.provider_key()) {
            return None;
        }

        match adapter.get_shipment_info(identifier).await {
            Ok(payload) => {
                let tracking = normalization::normalize(&payload, identifier, tracking_type);
                info!(
                    identifier,
                    carrier = %tracking.carrier_code,
                    status = %tracking.status,
                    "Live tracking lookup succeeded"
                );
                Some(tracking)
            }
            Err(e) => {
                warn!(identifier, error = %e, "Provider lookup failed, using fallback");
                None
            }
        }
    }

    fn live_calls_possible(&self, adapter: &dyn ProviderAdapter) -> bool {
        self.config.live_mode() && adapter.is_configured()
    }

    /// Cache and rate-limiter counters for observability
    pub fn metrics(&self) -> (crate::resilience::CacheMetrics, crate::resilience::RateLimiterMetrics) {
        (self.cache.metrics(), self.rate_limiter.metrics())
    }
}
