//! Shared utilities and common types for the TrialsFinder server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types and the layered configuration loader
//! - Error response structures and error codes
//! - Rate strings (`"100/hour"`) used by the throttling configuration

pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, CacheBackend, CacheConfig, ConfigError, Environment, LogFormat, LoggingConfig,
    RateLimitConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{Rate, RateParseError};
