//! Steward API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod state;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use steward_application::{AccessResolver, AccessService};
use steward_core::AppError;
use steward_infrastructure::{InMemoryAccessContextCache, PostgresAccessRepository};
use tracing::info;

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let resolution_config = config.resolution_config()?;
    info!(
        policy_version = resolution_config.fallback_policy.version(),
        strict_role_names = resolution_config.strict_role_names,
        access_context_ttl_seconds = config.access_context_ttl_seconds,
        "access resolution configured"
    );

    let repository = Arc::new(PostgresAccessRepository::new(pool));
    let resolver = AccessResolver::new(
        repository.clone(),
        repository.clone(),
        repository,
        resolution_config,
    );
    let app_state = AppState {
        access_service: AccessService::with_cache(
            resolver,
            Arc::new(InMemoryAccessContextCache::new()),
            config.access_context_ttl_seconds,
        ),
    };

    let app = api_router::build_router(app_state);
    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "steward-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
