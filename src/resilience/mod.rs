//! # Resilience Layer
//!
//! Request budgets and lookup memoization consulted before any provider
//! call. Neither component queues or retries: a denied call or cache miss is
//! reported to the caller, which decides whether to fall back.

pub mod cache;
pub mod rate_limiter;

pub use cache::{cache_key, CacheConfig, CacheMetrics, TrackingCache};
pub use rate_limiter::{RateLimiter, RateLimiterConfig, RateLimiterMetrics};
