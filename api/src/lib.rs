//! # TrialsFinder API
//!
//! HTTP surface of the throttling layer: the request throttling middleware,
//! status and admin endpoints, and the application factory used by the
//! `tf_api` binary.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod telemetry;

pub use app::{configure, create_app, AppState};
