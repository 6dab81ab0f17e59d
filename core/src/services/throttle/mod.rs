//! Throttle service module
//!
//! This module provides request throttling for the marketplace API:
//! - Tier-based sliding window limits per account or address
//! - Token bucket burst limits
//! - Per-endpoint limits for sensitive routes
//! - Per-address limits with suspicious address escalation
//! - Request analytics and admin operations
//!
//! Every throttle reads and writes its counters through [`RateStore`]. The
//! read-modify-write cycle is not atomic, so concurrent requests for the same
//! key can both be admitted at the limit boundary.

mod analytics;
mod burst;
mod composite;
mod endpoint;
mod ip;
mod keys;
mod policy;
mod service;
mod sliding_window;
mod store;
mod tier;
mod token_bucket;
mod traits;

#[cfg(test)]
mod tests;

pub use analytics::{AnalyticsSnapshot, EndpointStats, HourStats, RequestAnalytics};
pub use burst::BurstThrottle;
pub use composite::CompositeThrottle;
pub use endpoint::EndpointThrottle;
pub use ip::IpThrottle;
pub use keys::CacheKeys;
pub use policy::{RatePolicy, RatePolicyResolver};
pub use service::{ResetReport, ThrottleService};
pub use sliding_window::SlidingWindowLimiter;
pub use store::{Clock, RateStore, SystemClock};
pub use tier::TierThrottle;
pub use token_bucket::TokenBucketLimiter;
pub use traits::Throttle;
