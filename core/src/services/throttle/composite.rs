//! Runs several throttles against one request

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::{Quota, Rejection, RequestContext, ThrottleDecision, ThrottleOutcome};
use crate::errors::{DomainResult, StoreError};

use super::traits::Throttle;

/// Ordered chain of throttles
///
/// The first rejection wins and later throttles are not consulted. Quota
/// headers come from the first throttle that counted the request.
pub struct CompositeThrottle {
    throttles: Vec<Arc<dyn Throttle>>,
    fail_open: bool,
}

impl CompositeThrottle {
    pub fn new(throttles: Vec<Arc<dyn Throttle>>, fail_open: bool) -> Self {
        Self {
            throttles,
            fail_open,
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.throttles.iter().map(|t| t.name()).collect()
    }

    /// Evaluate every throttle in order
    pub async fn check(&self, request: &RequestContext) -> DomainResult<ThrottleOutcome> {
        let mut quota: Option<Quota> = None;

        for throttle in &self.throttles {
            let decision = self.evaluate_one(throttle.as_ref(), request).await?;

            match decision {
                ThrottleDecision::Rejected { limit, retry_after } => {
                    info!(
                        throttle = throttle.name(),
                        ident = %request.identity,
                        path = %request.path,
                        limit,
                        retry_after_secs = retry_after.as_secs(),
                        "Request throttled"
                    );
                    return Ok(ThrottleOutcome::Rejected(Rejection {
                        throttle: throttle.name(),
                        limit,
                        retry_after,
                    }));
                }
                ThrottleDecision::Allowed {
                    limit,
                    remaining,
                    reset_after,
                } => {
                    quota.get_or_insert(Quota {
                        limit,
                        remaining,
                        reset_after,
                    });
                }
                ThrottleDecision::Exempt => {}
            }
        }

        Ok(ThrottleOutcome::Admitted { quota })
    }

    async fn evaluate_one(
        &self,
        throttle: &dyn Throttle,
        request: &RequestContext,
    ) -> Result<ThrottleDecision, StoreError> {
        match throttle.evaluate(request).await {
            Ok(decision) => Ok(decision),
            Err(e) if self.fail_open => {
                warn!(
                    throttle = throttle.name(),
                    error = %e,
                    "Throttle store unavailable, allowing request"
                );
                Ok(ThrottleDecision::Exempt)
            }
            Err(e) => Err(e),
        }
    }
}
