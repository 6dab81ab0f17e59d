pub mod admin;
pub mod error;
pub mod health;
pub mod throttle;
