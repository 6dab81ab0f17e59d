//! Usage records persisted in the counter store.
//!
//! Timestamps are unix milliseconds.

use serde::{Deserialize, Serialize};

/// Request timestamps inside a trailing window, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlidingWindowRecord {
    pub timestamps: Vec<i64>,
}

impl SlidingWindowRecord {
    /// Drop every timestamp at or before `window_start`
    pub fn prune(&mut self, window_start: i64) {
        self.timestamps.retain(|&ts| ts > window_start);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn oldest(&self) -> Option<i64> {
        self.timestamps.iter().copied().min()
    }

    /// Record a request, keeping the list ordered
    pub fn push(&mut self, timestamp: i64) {
        let index = self.timestamps.partition_point(|&ts| ts <= timestamp);
        self.timestamps.insert(index, timestamp);
    }
}

/// Token bucket state: tokens left and when they were last topped up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TokenBucketState {
    pub tokens: f64,
    pub last_refill: i64,
}

impl TokenBucketState {
    /// A bucket filled to capacity at `now`
    pub fn full(capacity: f64, now: i64) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    /// Add the tokens earned since the last refill, capped at `capacity`.
    ///
    /// A clock that moved backwards earns nothing.
    pub fn refill(&mut self, now: i64, capacity: f64, refill_rate: f64) {
        let elapsed_secs = (now - self.last_refill).max(0) as f64 / 1000.0;
        let tokens = self.tokens + elapsed_secs * refill_rate;
        self.tokens = tokens.clamp(0.0, capacity);
        self.last_refill = now.max(self.last_refill);
    }

    /// Take one token if available
    pub fn try_take(&mut self) -> bool {
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
