use intake_core::IntakeConfig;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = IntakeConfig::from_env()?;

    intake_api::telemetry::init_tracing();

    // Initialize the application (database, storage, notifier, routes)
    let (_state, router) = intake_api::setup::initialize_app(&config).await?;

    // Start the server
    intake_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
