use actix_web::{web, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use tf_api::{create_app, telemetry, AppState};
use tf_core::{SystemClock, ThrottleService};
use tf_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.logging);

    info!(
        environment = %config.environment,
        backend = ?config.cache.backend,
        "Starting TrialsFinder API"
    );

    let store = tf_infra::build_store(&config.cache)
        .await
        .context("Failed to initialise the counter store")?;
    let throttle = ThrottleService::from_config(
        &config.rate_limit,
        &config.cache,
        store,
        Arc::new(SystemClock),
    )
    .context("Invalid rate limit configuration")?;
    let state = web::Data::new(AppState::new(Arc::new(throttle)));

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let mut server = HttpServer::new(move || create_app(state.clone()));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("Server error")
}
