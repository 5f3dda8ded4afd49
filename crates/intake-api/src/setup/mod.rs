//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use intake_core::IntakeConfig;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: &IntakeConfig) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    tracing::info!(
        environment = %config.environment,
        storage_backend = %config.storage.backend,
        "Configuration loaded and validated successfully"
    );

    crate::error::set_production(config.is_production());

    let state = services::initialize_services(config).await?;

    let router = routes::setup_routes(&config.cors_origins, state.clone());

    Ok((state, router))
}
