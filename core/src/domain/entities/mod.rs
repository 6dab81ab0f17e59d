//! Domain entities representing throttled callers and their stored usage.

pub mod identity;
pub mod rate_record;


// Re-export commonly used types
pub use identity::{Identity, Tier};
pub use rate_record::{SlidingWindowRecord, TokenBucketState};
