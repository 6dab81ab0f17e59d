//! Request throttling middleware
//!
//! Runs every non-exempt request through the [`ThrottleService`]. Admitted
//! responses carry `X-RateLimit-*` headers; rejected requests get a 429 with
//! `Retry-After`. When the counter store is down and the service is
//! configured to fail closed, requests are answered with 503.

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::{
        header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER},
        StatusCode,
    },
    Error, HttpResponse,
};
use chrono::Utc;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    time::Duration,
};
use tracing::error;

use tf_core::{ceil_secs, Quota, Rejection, RequestContext, ThrottleOutcome, ThrottleService};
use tf_shared::error_codes;

use super::identity::{client_ip, resolve_identity};
use crate::dto::error::{ErrorResponse, ErrorResponseExt};

pub const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Throttling middleware factory
pub struct RequestThrottle {
    throttle: Arc<ThrottleService>,
}

impl RequestThrottle {
    pub fn new(throttle: Arc<ThrottleService>) -> Self {
        Self { throttle }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestThrottle
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestThrottleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestThrottleMiddleware {
            service: Rc::new(service),
            throttle: self.throttle.clone(),
        }))
    }
}

/// Throttling middleware service
pub struct RequestThrottleMiddleware<S> {
    service: Rc<S>,
    throttle: Arc<ThrottleService>,
}

impl<S, B> Service<ServiceRequest> for RequestThrottleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let throttle = self.throttle.clone();

        Box::pin(async move {
            let config = throttle.config();
            if !config.enabled || throttle.is_exempt(req.path()) {
                return service.call(req).await.map(ServiceResponse::map_into_left_body);
            }

            let ip = client_ip(req.request());
            let identity = resolve_identity(req.request(), config.trust_identity_headers, &ip);
            let context = RequestContext::new(identity, ip, req.method().as_str(), req.path());

            match throttle.check(&context).await {
                Ok(ThrottleOutcome::Admitted { quota }) => {
                    let mut res = service.call(req).await?;
                    if let Some(quota) = quota {
                        apply_quota_headers(res.headers_mut(), &quota);
                    }
                    Ok(res.map_into_left_body())
                }
                Ok(ThrottleOutcome::Rejected(rejection)) => {
                    let response = rate_limited_response(&rejection);
                    Ok(req.into_response(response).map_into_right_body())
                }
                Err(e) => {
                    error!(error = %e, path = %context.path, "Throttle check failed");
                    let response = ErrorResponse::new(
                        error_codes::CACHE_ERROR,
                        "Rate limiting is temporarily unavailable",
                    )
                    .to_response(StatusCode::SERVICE_UNAVAILABLE);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Unix time in whole seconds when `after` has elapsed
fn reset_at(after: Duration) -> i64 {
    Utc::now().timestamp() + ceil_secs(after) as i64
}

fn apply_quota_headers(headers: &mut HeaderMap, quota: &Quota) {
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(quota.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(quota.remaining));
    headers.insert(RATE_LIMIT_RESET, HeaderValue::from(reset_at(quota.reset_after)));
}

/// 429 response for a rejected request
fn rate_limited_response(rejection: &Rejection) -> HttpResponse {
    let retry_after = rejection.retry_after_secs();
    let body = ErrorResponse::new(
        error_codes::RATE_LIMIT_EXCEEDED,
        format!(
            "Request was throttled. Expected available in {} seconds.",
            retry_after
        ),
    )
    .add_detail("retry_after_seconds", retry_after)
    .add_detail("limit", rejection.limit)
    .add_detail("throttle", rejection.throttle);

    let mut response = body.to_response(StatusCode::TOO_MANY_REQUESTS);
    let headers = response.headers_mut();
    headers.insert(RETRY_AFTER, HeaderValue::from(retry_after));
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(rejection.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(0u32));
    headers.insert(
        RATE_LIMIT_RESET,
        HeaderValue::from(reset_at(Duration::from_secs(retry_after))),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_response_headers() {
        let rejection = Rejection {
            throttle: "tier",
            limit: 100,
            retry_after: Duration::from_millis(1500),
        };

        let response = rate_limited_response(&rejection);

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "2");
        assert_eq!(response.headers().get(RATE_LIMIT_LIMIT).unwrap(), "100");
        assert_eq!(response.headers().get(RATE_LIMIT_REMAINING).unwrap(), "0");
    }

    #[test]
    fn test_reset_is_in_the_future() {
        let now = Utc::now().timestamp();
        assert!(reset_at(Duration::from_millis(1)) >= now + 1);
    }
}
