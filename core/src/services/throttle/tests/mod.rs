//! Tests for the throttle service

mod mocks;

mod endpoint_tests;
mod policy_tests;
