//! Hourly request counters per endpoint

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::errors::StoreError;

use super::keys::CacheKeys;
use super::store::{read_record, write_record, Clock, RateStore};

const SECONDS_PER_HOUR: i64 = 3600;
const ANALYTICS_TTL: Duration = Duration::from_secs(86_400);

/// Counters for one endpoint in one hour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointStats {
    pub requests: u64,
    pub throttled: u64,
}

/// Stored record: hour bucket (`unix_secs / 3600`) -> path -> counters
type HourlyStats = BTreeMap<i64, BTreeMap<String, EndpointStats>>;

/// One hour of traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourStats {
    pub hour_start: DateTime<Utc>,
    pub endpoints: BTreeMap<String, EndpointStats>,
}

/// Retained analytics, oldest hour first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnalyticsSnapshot {
    pub hours: Vec<HourStats>,
    pub total_requests: u64,
    pub total_throttled: u64,
}

/// Keeps per-hour request and throttle counts for the last `retention_hours`
#[derive(Clone)]
pub struct RequestAnalytics {
    store: Arc<dyn RateStore>,
    clock: Arc<dyn Clock>,
    keys: CacheKeys,
    retention_hours: u32,
}

impl RequestAnalytics {
    pub fn new(
        store: Arc<dyn RateStore>,
        clock: Arc<dyn Clock>,
        keys: CacheKeys,
        retention_hours: u32,
    ) -> Self {
        Self {
            store,
            clock,
            keys,
            retention_hours: retention_hours.max(1),
        }
    }

    /// Count one request against `path`
    pub async fn record(&self, path: &str, throttled: bool) -> Result<(), StoreError> {
        let key = self.keys.analytics();
        let hour = self.current_hour();

        let mut stats: HourlyStats = read_record(self.store.as_ref(), &key)
            .await?
            .unwrap_or_default();

        let entry = stats
            .entry(hour)
            .or_default()
            .entry(path.to_string())
            .or_default();
        entry.requests += 1;
        if throttled {
            entry.throttled += 1;
        }

        self.retain_recent(&mut stats, hour);
        debug!(path, hour, throttled, "Recorded request analytics");
        write_record(self.store.as_ref(), &key, &stats, ANALYTICS_TTL).await
    }

    pub async fn snapshot(&self) -> Result<AnalyticsSnapshot, StoreError> {
        let mut stats: HourlyStats = read_record(self.store.as_ref(), &self.keys.analytics())
            .await?
            .unwrap_or_default();
        self.retain_recent(&mut stats, self.current_hour());

        let mut snapshot = AnalyticsSnapshot::default();
        for (hour, endpoints) in stats {
            for counters in endpoints.values() {
                snapshot.total_requests += counters.requests;
                snapshot.total_throttled += counters.throttled;
            }
            let hour_start = Utc
                .timestamp_opt(hour * SECONDS_PER_HOUR, 0)
                .single()
                .unwrap_or_default();
            snapshot.hours.push(HourStats {
                hour_start,
                endpoints,
            });
        }

        Ok(snapshot)
    }

    fn current_hour(&self) -> i64 {
        self.clock.now().timestamp().div_euclid(SECONDS_PER_HOUR)
    }

    fn retain_recent(&self, stats: &mut HourlyStats, current_hour: i64) {
        let oldest = current_hour - i64::from(self.retention_hours) + 1;
        stats.retain(|hour, _| *hour >= oldest);
    }
}
