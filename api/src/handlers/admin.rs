//! Operator endpoints for throttle analytics and resets
//!
//! Hidden (404) unless an admin token is configured; callers must send it in
//! `X-Admin-Token`.

use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use tracing::warn;

use tf_shared::error_codes;

use crate::app::AppState;
use crate::dto::error::{ErrorResponse, ErrorResponseExt};
use crate::dto::ResetResponse;
use crate::handlers::error::handle_domain_error;

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

fn authorize(req: &HttpRequest, state: &AppState) -> Result<(), HttpResponse> {
    let Some(expected) = state.throttle.config().admin_token.as_deref() else {
        return Err(ErrorResponse::new(
            error_codes::NOT_FOUND,
            "The requested resource was not found",
        )
        .to_response(StatusCode::NOT_FOUND));
    };

    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided != Some(expected) {
        warn!(path = %req.path(), "Rejected admin request with missing or wrong token");
        return Err(ErrorResponse::new(
            error_codes::UNAUTHORIZED,
            "A valid admin token is required",
        )
        .to_response(StatusCode::UNAUTHORIZED));
    }

    Ok(())
}

/// Hourly request and throttle counts per endpoint
pub async fn analytics(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if let Err(response) = authorize(&req, &state) {
        return response;
    }

    match state.throttle.analytics().await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => handle_domain_error(e),
    }
}

/// Clear every throttle window held for an identity
pub async fn reset_identity(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> HttpResponse {
    if let Err(response) = authorize(&req, &state) {
        return response;
    }

    match state.throttle.reset(&path.into_inner()).await {
        Ok(report) => HttpResponse::Ok().json(ResetResponse::from(report)),
        Err(e) => handle_domain_error(e),
    }
}
