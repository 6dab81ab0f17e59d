//! Trait implemented by every throttle

use async_trait::async_trait;

use crate::domain::{RequestContext, ThrottleDecision};
use crate::errors::StoreError;

/// A single rate limiting strategy
#[async_trait]
pub trait Throttle: Send + Sync {
    /// Short name reported when this throttle rejects a request
    fn name(&self) -> &'static str;

    /// Decide on a request, counting it when admitted
    async fn evaluate(&self, request: &RequestContext) -> Result<ThrottleDecision, StoreError>;
}
