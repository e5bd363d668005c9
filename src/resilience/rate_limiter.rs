//! # Provider Rate Limiter
//!
//! Fixed-window request budgets per provider. `allow` answers whether the
//! caller may spend one request right now; it never queues or delays. Once
//! the window budget is exhausted the caller falls back to cache or synthetic
//! data.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::constants::system;

/// Configuration parameters for the fixed-window rate limiter
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Requests allowed per provider per window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: system::DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            window: Duration::from_secs(system::DEFAULT_RATE_LIMIT_WINDOW_SECS),
        }
    }
}

/// Point-in-time rate limiter counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimiterMetrics {
    pub allowed: u64,
    pub denied: u64,
}

#[derive(Debug)]
struct WindowState {
    window_start: Instant,
    count: u32,
}

/// Per-provider fixed-window request budget.
///
/// State lives in a `DashMap` keyed by provider, safe to consult from any
/// task without external locking.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    windows: DashMap<String, WindowState>,
    allowed: AtomicU64,
    denied: AtomicU64,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
            allowed: AtomicU64::new(0),
            denied: AtomicU64::new(0),
        }
    }

    /// Check whether one request may be spent for `provider_key` right now.
    ///
    /// Consumes budget on success. Returns `false` once the window budget is
    /// exhausted; the counter resets when the window elapses.
    pub fn allow(&self, provider_key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(provider_key.to_string())
            .or_insert_with(|| WindowState {
                window_start: now,
                count: 0,
            });

        if now.duration_since(entry.window_start) >= self.config.window {
            entry.window_start = now;
            entry.count = 0;
            debug!(provider = provider_key, "Rate limit window reset");
        }

        if entry.count < self.config.max_requests {
            entry.count += 1;
            self.allowed.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            self.denied.fetch_add(1, Ordering::Relaxed);
            warn!(
                provider = provider_key,
                budget = self.config.max_requests,
                "Rate limit budget exhausted for current window"
            );
            false
        }
    }

    /// Remaining budget for a provider in the current window
    pub fn remaining(&self, provider_key: &str) -> u32 {
        match self.windows.get(provider_key) {
            Some(entry) if entry.window_start.elapsed() < self.config.window => {
                self.config.max_requests.saturating_sub(entry.count)
            }
            _ => self.config.max_requests,
        }
    }

    pub fn metrics(&self) -> RateLimiterMetrics {
        RateLimiterMetrics {
            allowed: self.allowed.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}
