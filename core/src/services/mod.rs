//! Business services containing throttling logic.

pub mod throttle;

// Re-export commonly used types
pub use throttle::{
    AnalyticsSnapshot, BurstThrottle, CacheKeys, Clock, CompositeThrottle, EndpointStats,
    EndpointThrottle, HourStats, IpThrottle, RatePolicy, RatePolicyResolver, RateStore,
    RequestAnalytics, ResetReport, SlidingWindowLimiter, SystemClock, Throttle,
    ThrottleService, TierThrottle, TokenBucketLimiter,
};
