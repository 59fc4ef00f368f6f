//! ClientDesk server
//!
//! ```bash
//! # Start PostgreSQL, then
//! cargo run --bin clientdesk
//! ```

use clientdesk_server::{Config, bootstrap, build_router};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,clientdesk=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    config.validate()?;
    tracing::info!(
        environment = %config.server.environment,
        address = %config.server.bind_address(),
        "Configuration loaded"
    );

    clientdesk_web::expose_error_details(config.server.is_development());

    let state = bootstrap::build_state(&config).await?;
    let app = build_router(state, &config.router_settings());

    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "ClientDesk server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
