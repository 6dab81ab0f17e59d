//! # TrialsFinder Core
//!
//! Request throttling for the TrialsFinder marketplace.
//! This crate contains the throttling domain types, the counter store seam,
//! the sliding window and token bucket limiters, and the throttle service
//! that combines tier, burst, endpoint and address limits.

pub mod domain;
pub mod errors;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
