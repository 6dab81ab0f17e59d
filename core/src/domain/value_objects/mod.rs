//! Value objects representing immutable domain concepts.

pub mod decision;
pub mod request;

// Re-export commonly used types
pub use decision::{ceil_secs, Quota, Rejection, ThrottleDecision, ThrottleOutcome, UsageSnapshot};
pub use request::RequestContext;
