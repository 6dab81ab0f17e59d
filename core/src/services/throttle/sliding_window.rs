//! Sliding window counter

use std::sync::Arc;
use std::time::Duration;
use tf_shared::Rate;
use tracing::debug;

use crate::domain::{SlidingWindowRecord, ThrottleDecision, UsageSnapshot};
use crate::errors::StoreError;

use super::store::{read_record, write_record, Clock, RateStore};

/// Counts requests inside a trailing window
///
/// Each key holds the timestamps of admitted requests. Rejected requests are
/// never recorded, so stored usage never exceeds what was actually admitted.
#[derive(Clone)]
pub struct SlidingWindowLimiter {
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowLimiter {
    pub fn new(store: Arc<dyn RateStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Admit and record a request under `key`, or reject it when the window is full
    pub async fn hit(&self, key: &str, rate: Rate) -> Result<ThrottleDecision, StoreError> {
        let now = self.clock.now_millis();
        let window_ms = window_millis(rate.period);
        let limit = rate.num_requests;

        let mut record = self.load(key, now, window_ms).await?;

        if record.len() >= limit as usize {
            let retry_after = until_expiry(&record, now, window_ms);
            debug!(key, limit, count = record.len(), "Sliding window full");
            return Ok(ThrottleDecision::Rejected { limit, retry_after });
        }

        record.push(now);
        write_record(self.store.as_ref(), key, &record, rate.period).await?;

        Ok(ThrottleDecision::Allowed {
            limit,
            remaining: limit.saturating_sub(record.len() as u32),
            reset_after: until_expiry(&record, now, window_ms),
        })
    }

    /// Record an event under `key`, returning the number of events now inside
    /// the window
    ///
    /// Once the window holds `cap` events nothing more is written, so the
    /// stored record never grows past `cap`.
    pub async fn record(&self, key: &str, window: Duration, cap: u32) -> Result<u32, StoreError> {
        let now = self.clock.now_millis();
        let window_ms = window_millis(window);

        let mut record = self.load(key, now, window_ms).await?;
        if record.len() >= cap as usize {
            return Ok(record.len() as u32);
        }
        record.push(now);
        write_record(self.store.as_ref(), key, &record, window).await?;

        Ok(record.len() as u32)
    }

    /// Report usage under `key` without recording anything
    pub async fn peek(&self, key: &str, rate: Rate) -> Result<UsageSnapshot, StoreError> {
        let now = self.clock.now_millis();
        let window_ms = window_millis(rate.period);
        let record = self.load(key, now, window_ms).await?;

        let used = record.len() as u32;
        Ok(UsageSnapshot {
            limit: rate.num_requests,
            used,
            remaining: rate.num_requests.saturating_sub(used),
            reset_after: until_expiry(&record, now, window_ms),
        })
    }

    async fn load(
        &self,
        key: &str,
        now: i64,
        window_ms: i64,
    ) -> Result<SlidingWindowRecord, StoreError> {
        let mut record: SlidingWindowRecord = read_record(self.store.as_ref(), key)
            .await?
            .unwrap_or_default();
        record.prune(now.saturating_sub(window_ms));
        Ok(record)
    }
}

fn window_millis(window: Duration) -> i64 {
    i64::try_from(window.as_millis()).unwrap_or(i64::MAX)
}

/// Time until the oldest entry leaves the window; a full window when empty
fn until_expiry(record: &SlidingWindowRecord, now: i64, window_ms: i64) -> Duration {
    let remaining_ms = record
        .oldest()
        .map(|oldest| oldest.saturating_add(window_ms) - now)
        .unwrap_or(window_ms);
    Duration::from_millis(remaining_ms.max(0) as u64)
}
