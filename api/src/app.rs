//! Application state and factory
//!
//! This module holds the shared application state and builds the Actix-web
//! application with its middleware and routes.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::StatusCode,
    web, App, Error,
};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use tf_core::ThrottleService;
use tf_shared::error_codes;

use crate::dto::error::{ErrorResponse, ErrorResponseExt};
use crate::handlers::{admin, health, throttle};
use crate::middleware::RequestThrottle;

/// State shared by every handler
pub struct AppState {
    pub throttle: Arc<ThrottleService>,
}

impl AppState {
    pub fn new(throttle: Arc<ThrottleService>) -> Self {
        Self { throttle }
    }
}

/// Register all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check)).service(
        web::scope("/api/v1")
            .route("/throttle/status", web::get().to(throttle::throttle_status))
            .service(
                web::scope("/admin/throttle")
                    .route("/analytics", web::get().to(admin::analytics))
                    .route("/identities/{ident}", web::delete().to(admin::reset_identity)),
            ),
    );
}

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let throttle = state.throttle.clone();

    App::new()
        .app_data(state)
        // Order matters: the logger wraps the throttle so rejections are logged too
        .wrap(RequestThrottle::new(throttle))
        .wrap(TracingLogger::default())
        .configure(configure)
        .default_service(web::route().to(|| async {
            ErrorResponse::new(
                error_codes::NOT_FOUND,
                "The requested resource was not found",
            )
            .to_response(StatusCode::NOT_FOUND)
        }))
}
