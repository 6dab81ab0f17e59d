//! Maps identities to the rate they are held to

use tf_shared::config::TierRates;
use tf_shared::Rate;

use crate::domain::{Identity, Tier};

/// Rate an identity is held to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatePolicy {
    Limited(Rate),
    Unlimited,
}

/// Tiered lookup table
#[derive(Debug, Clone)]
pub struct RatePolicyResolver {
    tiers: TierRates,
}

impl RatePolicyResolver {
    pub fn new(tiers: TierRates) -> Self {
        Self { tiers }
    }

    /// Resolve the policy for an identity.
    ///
    /// Anonymous callers get the anonymous rate; enterprise accounts are
    /// unlimited while the bypass is enabled.
    pub fn resolve(&self, identity: &Identity) -> RatePolicy {
        match identity.tier() {
            None => RatePolicy::Limited(self.tiers.anonymous),
            Some(Tier::Enterprise) if self.tiers.enterprise_bypass => RatePolicy::Unlimited,
            Some(tier) => RatePolicy::Limited(self.rate_for_tier(tier)),
        }
    }

    pub fn rate_for_tier(&self, tier: Tier) -> Rate {
        match tier {
            Tier::Free => self.tiers.free,
            Tier::Basic => self.tiers.basic,
            Tier::Premium => self.tiers.premium,
            Tier::Enterprise => self.tiers.enterprise,
        }
    }
}
