//! Infrastructure service implementations

pub mod throttle;

pub use throttle::RedisRateStore;
