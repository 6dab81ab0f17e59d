use actix_web::{web, HttpRequest, HttpResponse};

use crate::app::AppState;
use crate::dto::ThrottleStatusResponse;
use crate::handlers::error::handle_domain_error;
use crate::middleware::identity::{client_ip, resolve_identity};

/// Caller's current tier usage, without consuming any of it
pub async fn throttle_status(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let trust_headers = state.throttle.config().trust_identity_headers;
    let identity = resolve_identity(&req, trust_headers, &client_ip(&req));

    match state.throttle.status(&identity).await {
        Ok(usage) => HttpResponse::Ok().json(ThrottleStatusResponse::new(
            identity.cache_ident(),
            identity.tier().map(|tier| tier.to_string()),
            usage,
        )),
        Err(e) => handle_domain_error(e),
    }
}
