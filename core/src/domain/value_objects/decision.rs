//! Outcomes of throttle evaluation.

use serde::Serialize;
use std::time::Duration;

/// Result of one throttle looking at one request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrottleDecision {
    /// Admitted and counted
    Allowed {
        limit: u32,
        remaining: u32,
        /// Time until the window frees up or the bucket is full again
        reset_after: Duration,
    },
    /// The throttle does not apply to this request (bypass, no matching rule,
    /// or the store could not be reached and the throttle failed open)
    Exempt,
    /// Over the limit
    Rejected { limit: u32, retry_after: Duration },
}

impl ThrottleDecision {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ThrottleDecision::Rejected { .. })
    }
}

/// Quota figures reported back to the client in `X-RateLimit-*` headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quota {
    pub limit: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

/// The throttle that turned a request away
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    /// Name of the rejecting throttle ("tier", "ip", "endpoint", "burst")
    pub throttle: &'static str,
    pub limit: u32,
    pub retry_after: Duration,
}

impl Rejection {
    /// Retry hint in whole seconds, never zero
    pub fn retry_after_secs(&self) -> u64 {
        ceil_secs(self.retry_after).max(1)
    }
}

/// Combined result of all throttles for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThrottleOutcome {
    Admitted { quota: Option<Quota> },
    Rejected(Rejection),
}

impl ThrottleOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, ThrottleOutcome::Admitted { .. })
    }
}

/// Read-only view of a caller's usage in the tier window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    pub limit: u32,
    pub used: u32,
    pub remaining: u32,
    pub reset_after: Duration,
}

/// Round a duration up to whole seconds
pub fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}
