use actix_web::{web, HttpResponse};

use crate::app::AppState;
use crate::dto::HealthResponse;

/// Liveness plus counter store health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_healthy = state.throttle.store_healthy().await;

    HttpResponse::Ok().json(HealthResponse {
        status: if store_healthy { "healthy" } else { "degraded" },
        service: "trialsfinder-api",
        version: env!("CARGO_PKG_VERSION"),
        store: if store_healthy { "ok" } else { "unavailable" },
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
