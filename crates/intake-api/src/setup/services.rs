//! Wiring of stores, notifier and pipeline.

use std::sync::Arc;

use anyhow::{Context, Result};
use intake_core::IntakeConfig;
use intake_db::{connect_pool, PgSubmissionRepository, PoolSettings, RecordStore};
use intake_services::{EmailNotifier, PipelineConfig, SubmissionPipeline};
use intake_storage::create_photo_store;

use crate::state::AppState;

pub async fn initialize_services(config: &IntakeConfig) -> Result<Arc<AppState>> {
    let pool = connect_pool(
        &config.database_url,
        &PoolSettings {
            max_connections: config.db_max_connections,
            acquire_timeout: std::time::Duration::from_secs(config.db_timeout_seconds),
        },
    )
    .await
    .context("Failed to connect to database")?;
    let records: Arc<dyn RecordStore> = Arc::new(PgSubmissionRepository::new(pool));

    let photos = create_photo_store(&config.storage)
        .await
        .context("Failed to initialize photo storage")?;

    let notifier = Arc::new(
        EmailNotifier::from_config(&config.notify).context("Failed to configure SMTP notifier")?,
    );

    let pipeline = SubmissionPipeline::new(
        photos,
        records.clone(),
        notifier,
        PipelineConfig::from_config(config),
    );

    tracing::info!(
        io_timeout_secs = config.io_timeout.as_secs(),
        allowed_content_types = %config.allowed_content_types.join(","),
        "Submission pipeline ready"
    );

    Ok(Arc::new(AppState::new(Arc::new(pipeline), records)))
}
