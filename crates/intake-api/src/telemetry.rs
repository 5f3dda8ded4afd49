//! Tracing initialization for the server binary.

use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the console subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );

    let result = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake=debug,tower_http=debug".into()),
        )
        .with(console_fmt)
        .try_init();

    if result.is_ok() {
        tracing::info!("Tracing initialized");
    }
}
