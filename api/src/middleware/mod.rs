pub mod identity;
pub mod throttle;

pub use identity::{client_ip, resolve_identity, AuthenticatedAccount};
pub use throttle::{RequestThrottle, RequestThrottleMiddleware};
