use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use intake_core::constants::MAX_RETENTION_DAYS;
use intake_core::IntakeConfig;
use intake_db::{connect_pool, PgSubmissionRepository, PoolSettings};
use intake_services::RetentionSweeper;
use intake_storage::create_photo_store;

use intake_cli::{format_candidates, format_report, init_tracing};

#[derive(Parser, Debug)]
#[command(name = "intake-sweep")]
#[command(about = "Delete passport submissions older than the retention period")]
struct Args {
    /// List the submissions that would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Override RETENTION_DAYS for this run
    #[arg(
        long,
        value_name = "DAYS",
        value_parser = clap::value_parser!(i64).range(1..=MAX_RETENTION_DAYS)
    )]
    retention_days: Option<i64>,

    /// Output format: json or table (default: table)
    #[arg(long, default_value = "table")]
    format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    let mut config = IntakeConfig::from_env()?;
    if let Some(days) = args.retention_days {
        config.retention_days = days;
    }
    // The sweep needs no SMTP settings.
    config
        .validate_store_settings()
        .context("Configuration validation failed")?;

    let pool = connect_pool(
        &config.database_url,
        &PoolSettings {
            max_connections: 2,
            acquire_timeout: std::time::Duration::from_secs(config.db_timeout_seconds),
        },
    )
    .await
    .context("Failed to connect to database")?;
    let records = Arc::new(PgSubmissionRepository::new(pool));
    let photos = create_photo_store(&config.storage)
        .await
        .context("Failed to initialize photo storage")?;

    let sweeper = RetentionSweeper::new(photos, records)
        .with_retention(config.retention()?)
        .with_io_timeout(config.io_timeout);

    let now = chrono::Utc::now();
    let threshold = sweeper.threshold_at(now)?;
    tracing::info!(
        retention_days = config.retention_days,
        threshold = %threshold,
        dry_run = args.dry_run,
        "Starting retention sweep"
    );

    if args.dry_run {
        let candidates = sweeper.preview_at(now).await?;
        match args.format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(&candidates)?),
            _ => print!("{}", format_candidates(&candidates)),
        }
        return Ok(());
    }

    let report = sweeper.run_at(now).await?;
    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", format_report(&report)),
    }

    if !report.is_clean() {
        tracing::warn!(
            photo_failures = report.photo_failures,
            photos_missing = report.photos_missing,
            "Sweep finished with photo problems"
        );
    }

    Ok(())
}
