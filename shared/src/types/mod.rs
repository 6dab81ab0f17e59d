//! Common type definitions shared across crates

pub mod rate;

pub use rate::{Rate, RateParseError};
