//! Throttle service tying the throttles, analytics and admin operations together

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tf_shared::config::RateLimitConfig;
use tf_shared::CacheConfig;
use tracing::{debug, info, warn};

use crate::domain::{Identity, RequestContext, ThrottleOutcome, UsageSnapshot};
use crate::errors::{DomainError, DomainResult};

use super::analytics::{AnalyticsSnapshot, RequestAnalytics};
use super::burst::BurstThrottle;
use super::composite::CompositeThrottle;
use super::endpoint::EndpointThrottle;
use super::ip::IpThrottle;
use super::keys::CacheKeys;
use super::policy::RatePolicyResolver;
use super::sliding_window::SlidingWindowLimiter;
use super::store::{Clock, RateStore};
use super::tier::TierThrottle;
use super::token_bucket::TokenBucketLimiter;
use super::traits::Throttle;

/// What an identity reset removed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResetReport {
    pub ident: String,
    pub keys_cleared: Vec<String>,
    pub unflagged: bool,
}

/// Request throttling for the API
///
/// Throttles run in a fixed order: tier, address, endpoint, then burst.
/// Disabled throttles are left out of the chain.
pub struct ThrottleService {
    config: RateLimitConfig,
    store: Arc<dyn RateStore>,
    keys: CacheKeys,
    composite: CompositeThrottle,
    tier: Arc<TierThrottle>,
    endpoint: Arc<EndpointThrottle>,
    ip: Arc<IpThrottle>,
    analytics: Option<RequestAnalytics>,
}

impl ThrottleService {
    /// Build the service from configuration
    ///
    /// Fails when a configured proxy range is not valid CIDR notation.
    pub fn from_config(
        config: &RateLimitConfig,
        cache: &CacheConfig,
        store: Arc<dyn RateStore>,
        clock: Arc<dyn Clock>,
    ) -> DomainResult<Self> {
        let keys = CacheKeys::new(cache.clone());
        let limiter = SlidingWindowLimiter::new(store.clone(), clock.clone());

        let tier = Arc::new(TierThrottle::new(
            RatePolicyResolver::new(config.tiers.clone()),
            limiter.clone(),
            keys.clone(),
            config.tiers.scope.clone(),
        ));
        let ip = Arc::new(IpThrottle::new(
            config.ip.clone(),
            limiter.clone(),
            store.clone(),
            keys.clone(),
        )?);
        let endpoint = Arc::new(EndpointThrottle::new(
            config.endpoints.clone(),
            limiter,
            keys.clone(),
        ));

        let mut chain: Vec<Arc<dyn Throttle>> = Vec::new();
        if config.tiers.enabled {
            chain.push(tier.clone());
        }
        if config.ip.enabled {
            chain.push(ip.clone());
        }
        if config.endpoints.enabled {
            chain.push(endpoint.clone());
        }
        if config.burst.enabled {
            let bucket = TokenBucketLimiter::new(
                store.clone(),
                clock.clone(),
                config.burst.burst_size,
                config.burst.refill_rate,
                Duration::from_secs(config.burst.state_ttl_seconds),
            );
            chain.push(Arc::new(BurstThrottle::new(bucket, keys.clone())));
        }

        let composite = CompositeThrottle::new(chain, config.fail_open);
        info!(
            throttles = ?composite.names(),
            fail_open = config.fail_open,
            "Throttle service configured"
        );

        let analytics = config.analytics.enabled.then(|| {
            RequestAnalytics::new(
                store.clone(),
                clock,
                keys.clone(),
                config.analytics.retention_hours,
            )
        });

        Ok(Self {
            config: config.clone(),
            store,
            keys,
            composite,
            tier,
            endpoint,
            ip,
            analytics,
        })
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn is_exempt(&self, path: &str) -> bool {
        self.config.is_exempt(path)
    }

    /// Decide whether a request may proceed
    ///
    /// Store failures are absorbed when the service fails open. Otherwise
    /// they surface as [`DomainError::Store`].
    pub async fn check(&self, request: &RequestContext) -> DomainResult<ThrottleOutcome> {
        let outcome = self.composite.check(request).await?;

        if let Some(analytics) = &self.analytics {
            if let Err(e) = analytics.record(&request.path, !outcome.is_admitted()).await {
                debug!(error = %e, "Failed to record request analytics");
            }
        }

        Ok(outcome)
    }

    /// Current tier usage of an identity without consuming any of it
    ///
    /// `None` when the identity is not held to a tier limit.
    pub async fn status(&self, identity: &Identity) -> DomainResult<Option<UsageSnapshot>> {
        if !self.config.tiers.enabled {
            return Ok(None);
        }
        Ok(self.tier.usage(identity).await?)
    }

    pub async fn analytics(&self) -> DomainResult<AnalyticsSnapshot> {
        match &self.analytics {
            Some(analytics) => Ok(analytics.snapshot().await?),
            None => Ok(AnalyticsSnapshot::default()),
        }
    }

    /// Clear every window held for `ident` (`user:{id}` or `ip:{addr}`)
    pub async fn reset(&self, ident: &str) -> DomainResult<ResetReport> {
        let identity = Identity::from_cache_ident(ident).ok_or_else(|| DomainError::Validation {
            message: format!("Invalid identity '{}', expected user:<id> or ip:<address>", ident),
        })?;
        let ident = identity.cache_ident();

        let mut keys = vec![self.tier.key_for(&identity), self.keys.burst(&ident)];
        keys.extend(
            self.endpoint
                .endpoint_names()
                .map(|name| self.endpoint.key_for(name, &ident)),
        );
        if let Identity::Anonymous { address } = &identity {
            keys.push(self.keys.ip(address));
            keys.push(self.keys.ip_rejections(address));
        }

        let mut report = ResetReport {
            ident: ident.clone(),
            ..Default::default()
        };
        for key in keys {
            if self.store.delete(&key).await? {
                report.keys_cleared.push(key);
            }
        }
        if let Identity::Anonymous { address } = &identity {
            report.unflagged = self.ip.unflag(address).await?;
        }

        info!(
            ident = %report.ident,
            cleared = report.keys_cleared.len(),
            unflagged = report.unflagged,
            "Throttle state reset"
        );
        Ok(report)
    }

    /// Whether the counter store answers
    pub async fn store_healthy(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Throttle store health check failed");
                false
            }
        }
    }
}
