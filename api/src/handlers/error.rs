//! Mapping of domain errors to HTTP responses

use actix_web::{http::StatusCode, HttpResponse};
use tracing::error;

use tf_core::DomainError;
use tf_shared::error_codes;

use crate::dto::error::{ErrorResponse, ErrorResponseExt};

pub fn handle_domain_error(error: DomainError) -> HttpResponse {
    match error {
        DomainError::Validation { message } => {
            ErrorResponse::new(error_codes::BAD_REQUEST, message).to_response(StatusCode::BAD_REQUEST)
        }
        DomainError::Store(e) => {
            error!("Counter store error: {}", e);
            ErrorResponse::new(error_codes::CACHE_ERROR, "Counter store is temporarily unavailable")
                .to_response(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
