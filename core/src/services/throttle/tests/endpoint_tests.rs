use tf_shared::config::{EndpointLimit, EndpointRates};
use tf_shared::{CacheConfig, Rate};

use super::mocks::{ManualClock, MockStore};
use crate::domain::{Identity, RequestContext, ThrottleDecision, Tier};
use crate::services::throttle::{CacheKeys, EndpointThrottle, SlidingWindowLimiter, Throttle};

fn endpoint_throttle(rates: EndpointRates) -> EndpointThrottle {
    EndpointThrottle::new(
        rates,
        SlidingWindowLimiter::new(MockStore::new(), ManualClock::new()),
        CacheKeys::new(CacheConfig::memory()),
    )
}

fn request(method: &str, path: &str) -> RequestContext {
    RequestContext::new(Identity::account("7", Tier::Free), "203.0.113.7", method, path)
}

#[test]
fn test_first_matching_rule_wins() {
    let throttle = endpoint_throttle(EndpointRates::default());

    let rule = throttle.rule_for("POST", "/api/auth/login/").unwrap();
    assert_eq!(rule.name, "auth.login");
    assert_eq!(rule.rate, Rate::per_hour(5));

    // Rules are bound to POST
    assert!(throttle.rule_for("GET", "/api/auth/login/").is_none());
}

#[tokio::test]
async fn test_login_is_limited_separately() {
    let throttle = endpoint_throttle(EndpointRates::default());
    let login = request("post", "/api/auth/login/");

    for _ in 0..5 {
        assert!(!throttle.evaluate(&login).await.unwrap().is_rejected());
    }
    assert!(matches!(
        throttle.evaluate(&login).await.unwrap(),
        ThrottleDecision::Rejected { limit: 5, .. }
    ));

    // Another endpoint has its own window
    let register = request("POST", "/api/auth/register/");
    assert!(!throttle.evaluate(&register).await.unwrap().is_rejected());
}

#[tokio::test]
async fn test_unmatched_paths_use_default_rate() {
    let throttle = endpoint_throttle(EndpointRates::default());
    let req = request("GET", "/api/trials/");

    for _ in 0..100 {
        assert!(!throttle.evaluate(&req).await.unwrap().is_rejected());
    }
    assert!(matches!(
        throttle.evaluate(&req).await.unwrap(),
        ThrottleDecision::Rejected { limit: 100, .. }
    ));
}

#[tokio::test]
async fn test_unmatched_paths_exempt_when_disabled() {
    let throttle = endpoint_throttle(EndpointRates {
        throttle_unmatched: false,
        ..Default::default()
    });

    let decision = throttle.evaluate(&request("GET", "/api/trials/")).await.unwrap();

    assert_eq!(decision, ThrottleDecision::Exempt);
}

#[tokio::test]
async fn test_prefix_rule_matches_nested_paths() {
    let throttle = endpoint_throttle(EndpointRates {
        rules: vec![EndpointLimit {
            name: "exports".to_string(),
            path_pattern: "/api/exports/*".to_string(),
            method: None,
            rate: Rate::per_hour(1),
        }],
        ..Default::default()
    });

    let first = request("GET", "/api/exports/trials.csv");
    let second = request("DELETE", "/api/exports/42");

    assert!(!throttle.evaluate(&first).await.unwrap().is_rejected());
    assert!(throttle.evaluate(&second).await.unwrap().is_rejected());
}
