//! Token bucket limiter for short bursts

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::{ThrottleDecision, TokenBucketState};
use crate::errors::StoreError;

use super::store::{read_record, write_record, Clock, RateStore};

/// Refillable bucket of request tokens
///
/// A caller without stored state starts with a full bucket. The state is
/// only written back when a token is taken.
#[derive(Clone)]
pub struct TokenBucketLimiter {
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
    capacity: f64,
    refill_rate: f64,
    state_ttl: Duration,
}

impl TokenBucketLimiter {
    /// `refill_rate` is in tokens per second and must be positive
    pub fn new(
        store: Arc<dyn RateStore>,
        clock: Arc<dyn Clock>,
        capacity: u32,
        refill_rate: f64,
        state_ttl: Duration,
    ) -> Self {
        Self {
            store,
            clock,
            capacity: f64::from(capacity),
            refill_rate,
            state_ttl,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    /// Take a token for `key`, or reject when the bucket is empty
    pub async fn take(&self, key: &str) -> Result<ThrottleDecision, StoreError> {
        let now = self.clock.now_millis();
        let mut state: TokenBucketState = read_record(self.store.as_ref(), key)
            .await?
            .unwrap_or_else(|| TokenBucketState::full(self.capacity, now));

        state.refill(now, self.capacity, self.refill_rate);
        let limit = self.capacity();

        if !state.try_take() {
            let retry_after = self.seconds_for(1.0 - state.tokens);
            debug!(key, tokens = state.tokens, "Token bucket empty");
            return Ok(ThrottleDecision::Rejected { limit, retry_after });
        }

        write_record(self.store.as_ref(), key, &state, self.state_ttl).await?;

        Ok(ThrottleDecision::Allowed {
            limit,
            remaining: state.tokens.floor() as u32,
            reset_after: self.seconds_for(self.capacity - state.tokens),
        })
    }

    /// Time needed to earn `tokens` tokens
    fn seconds_for(&self, tokens: f64) -> Duration {
        Duration::try_from_secs_f64((tokens / self.refill_rate).max(0.0)).unwrap_or(Duration::MAX)
    }
}
