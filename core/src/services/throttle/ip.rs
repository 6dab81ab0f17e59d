//! Per-address throttle with suspicious address tracking

use async_trait::async_trait;
use ipnetwork::IpNetwork;
use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tf_shared::config::IpRateLimits;
use tf_shared::Rate;
use tracing::{info, warn};

use crate::domain::{RequestContext, ThrottleDecision};
use crate::errors::{DomainError, DomainResult, StoreError};

use super::keys::CacheKeys;
use super::sliding_window::SlidingWindowLimiter;
use super::store::{read_record, write_record, RateStore};
use super::traits::Throttle;

/// Limits every client address, whoever is calling from it
///
/// Addresses inside a configured proxy range, or flagged after repeatedly
/// hammering the limit, are held to the stricter rate.
pub struct IpThrottle {
    limits: IpRateLimits,
    proxy_ranges: Vec<IpNetwork>,
    limiter: SlidingWindowLimiter,
    store: Arc<dyn RateStore>,
    keys: CacheKeys,
}

impl IpThrottle {
    pub fn new(
        limits: IpRateLimits,
        limiter: SlidingWindowLimiter,
        store: Arc<dyn RateStore>,
        keys: CacheKeys,
    ) -> DomainResult<Self> {
        let proxy_ranges = limits
            .vpn_ranges
            .iter()
            .map(|range| {
                range
                    .trim()
                    .parse::<IpNetwork>()
                    .map_err(|e| DomainError::Validation {
                        message: format!("Invalid proxy range '{}': {}", range, e),
                    })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(Self {
            limits,
            proxy_ranges,
            limiter,
            store,
            keys,
        })
    }

    /// Whether the address falls inside a configured proxy range
    pub fn is_proxy_address(&self, ip: &str) -> bool {
        match ip.parse::<IpAddr>() {
            Ok(addr) => self.proxy_ranges.iter().any(|net| net.contains(addr)),
            Err(_) => false,
        }
    }

    pub async fn is_suspicious(&self, ip: &str) -> Result<bool, StoreError> {
        Ok(self.suspicious_set().await?.contains(ip))
    }

    /// Flag an address as suspicious
    pub async fn flag(&self, ip: &str) -> Result<(), StoreError> {
        let mut set = self.suspicious_set().await?;
        if set.insert(ip.to_string()) {
            self.save_suspicious_set(&set).await?;
        }
        Ok(())
    }

    /// Clear the suspicious flag, returning whether it was set
    pub async fn unflag(&self, ip: &str) -> Result<bool, StoreError> {
        let mut set = self.suspicious_set().await?;
        if !set.remove(ip) {
            return Ok(false);
        }
        if set.is_empty() {
            self.store.delete(&self.keys.suspicious_ips()).await?;
        } else {
            self.save_suspicious_set(&set).await?;
        }
        Ok(true)
    }

    /// Rate the address is currently held to
    pub async fn rate_for(&self, ip: &str) -> Result<Rate, StoreError> {
        if self.is_proxy_address(ip) || self.is_suspicious(ip).await? {
            Ok(self.limits.suspicious_rate)
        } else {
            Ok(self.limits.rate)
        }
    }

    async fn suspicious_set(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(read_record(self.store.as_ref(), &self.keys.suspicious_ips())
            .await?
            .unwrap_or_default())
    }

    async fn save_suspicious_set(&self, set: &BTreeSet<String>) -> Result<(), StoreError> {
        let ttl = Duration::from_secs(self.limits.suspicious_ttl_seconds);
        write_record(self.store.as_ref(), &self.keys.suspicious_ips(), set, ttl).await
    }

    /// Count a rejected attempt and flag the address once the rejections in
    /// the window reach the base limit
    async fn note_rejection(&self, ip: &str) -> Result<(), StoreError> {
        if self.is_suspicious(ip).await? {
            return Ok(());
        }

        let key = self.keys.ip_rejections(ip);
        let threshold = self.limits.rate.num_requests;
        let rejected = self
            .limiter
            .record(&key, self.limits.rate.period, threshold)
            .await?;

        if rejected >= threshold {
            warn!(ip, rejected, "Flagging address as suspicious");
            self.flag(ip).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Throttle for IpThrottle {
    fn name(&self) -> &'static str {
        "ip"
    }

    async fn evaluate(&self, request: &RequestContext) -> Result<ThrottleDecision, StoreError> {
        let ip = request.client_ip.as_str();
        let rate = self.rate_for(ip).await?;
        let decision = self.limiter.hit(&self.keys.ip(ip), rate).await?;

        if decision.is_rejected() {
            info!(ip, limit = rate.num_requests, "Address over its limit");
            // Tracking failures leave the decision as it is
            if let Err(e) = self.note_rejection(ip).await {
                warn!(ip, error = %e, "Failed to track address rejection");
            }
        }

        Ok(decision)
    }
}
