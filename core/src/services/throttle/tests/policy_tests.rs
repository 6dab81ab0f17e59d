use tf_shared::config::TierRates;
use tf_shared::{CacheConfig, Rate};

use super::mocks::{ManualClock, MockStore};
use crate::domain::{Identity, RequestContext, ThrottleDecision, Tier};
use crate::services::throttle::{
    CacheKeys, RatePolicy, RatePolicyResolver, SlidingWindowLimiter, Throttle, TierThrottle,
};

fn tier_throttle(tiers: TierRates) -> TierThrottle {
    let limiter = SlidingWindowLimiter::new(MockStore::new(), ManualClock::new());
    TierThrottle::new(
        RatePolicyResolver::new(tiers.clone()),
        limiter,
        CacheKeys::new(CacheConfig::memory()),
        tiers.scope,
    )
}

fn request(identity: Identity) -> RequestContext {
    RequestContext::new(identity, "203.0.113.7", "get", "/api/trials/")
}

#[test]
fn test_resolves_rate_by_tier() {
    let resolver = RatePolicyResolver::new(TierRates::default());

    let cases = [
        (Tier::Free, 100),
        (Tier::Basic, 500),
        (Tier::Premium, 2000),
    ];
    for (tier, expected) in cases {
        assert_eq!(
            resolver.resolve(&Identity::account("42", tier)),
            RatePolicy::Limited(Rate::per_hour(expected)),
            "tier {}",
            tier
        );
    }
}

#[test]
fn test_anonymous_gets_anonymous_rate() {
    let resolver = RatePolicyResolver::new(TierRates {
        anonymous: Rate::per_hour(60),
        ..Default::default()
    });

    assert_eq!(
        resolver.resolve(&Identity::anonymous("198.51.100.1")),
        RatePolicy::Limited(Rate::per_hour(60))
    );
}

#[test]
fn test_enterprise_bypass_can_be_disabled() {
    let bypass = RatePolicyResolver::new(TierRates::default());
    let limited = RatePolicyResolver::new(TierRates {
        enterprise_bypass: false,
        ..Default::default()
    });
    let enterprise = Identity::account("acme", Tier::Enterprise);

    assert_eq!(bypass.resolve(&enterprise), RatePolicy::Unlimited);
    assert_eq!(
        limited.resolve(&enterprise),
        RatePolicy::Limited(Rate::per_hour(10_000))
    );
}

#[tokio::test]
async fn test_enterprise_is_always_admitted() {
    let throttle = tier_throttle(TierRates {
        enterprise: Rate::per_hour(1),
        ..Default::default()
    });
    let req = request(Identity::account("acme", Tier::Enterprise));

    for _ in 0..500 {
        assert_eq!(throttle.evaluate(&req).await.unwrap(), ThrottleDecision::Exempt);
    }
}

#[tokio::test]
async fn test_identity_without_history_is_admitted() {
    let throttle = tier_throttle(TierRates {
        free: Rate::per_hour(1),
        anonymous: Rate::per_hour(1),
        ..Default::default()
    });

    for identity in [
        Identity::account("1", Tier::Free),
        Identity::account("2", Tier::Free),
        Identity::anonymous("198.51.100.1"),
        Identity::anonymous("2001:db8::1"),
    ] {
        let decision = throttle.evaluate(&request(identity.clone())).await.unwrap();
        assert!(!decision.is_rejected(), "{} was rejected", identity);
    }
}

#[tokio::test]
async fn test_tier_limit_applies_per_identity() {
    let throttle = tier_throttle(TierRates {
        free: Rate::per_hour(2),
        ..Default::default()
    });
    let alice = request(Identity::account("alice", Tier::Free));
    let bob = request(Identity::account("bob", Tier::Free));

    assert!(!throttle.evaluate(&alice).await.unwrap().is_rejected());
    assert!(!throttle.evaluate(&alice).await.unwrap().is_rejected());
    assert!(throttle.evaluate(&alice).await.unwrap().is_rejected());
    assert!(!throttle.evaluate(&bob).await.unwrap().is_rejected());
}

#[tokio::test]
async fn test_usage_reports_without_consuming() {
    let throttle = tier_throttle(TierRates::default());
    let identity = Identity::account("42", Tier::Basic);
    throttle.evaluate(&request(identity.clone())).await.unwrap();

    let usage = throttle.usage(&identity).await.unwrap().unwrap();
    assert_eq!(usage.limit, 500);
    assert_eq!(usage.used, 1);
    assert_eq!(usage.remaining, 499);

    let enterprise = Identity::account("acme", Tier::Enterprise);
    assert_eq!(throttle.usage(&enterprise).await.unwrap(), None);
}
