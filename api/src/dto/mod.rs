pub mod error;
pub mod throttle;

pub use error::{ErrorResponse, ErrorResponseExt};
pub use throttle::{HealthResponse, ResetResponse, ThrottleStatusResponse};
