//! Builds the application from configuration.
//!
//! Provider selection:
//! - SMTP email when `SMTP_HOST` is set, console output otherwise
//! - Google Calendar when an access token is set, office hours otherwise
//! - Razorpay always; without credentials order creation fails with a
//!   configuration error (unless payments are bypassed)
//! - Local directory storage for documents

use crate::config::Config;
use crate::state::{AppState, Gateways, Settings, Stores};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clientdesk_core::environment::{Clock, SystemClock};
use clientdesk_gateways::{
    CalendarGateway, ConsoleEmailTransport, EmailNotifier, EmailTransport, GoogleCalendarGateway,
    LocalDocumentStorage, OfficeHoursCalendar, RazorpayGateway, SmtpEmailTransport,
};
use clientdesk_postgres::PostgresStore;
use clientdesk_web::{HealthProbe, Readiness};
use std::sync::Arc;

/// Database probe for `/ready`.
struct DatabaseProbe(PostgresStore);

#[async_trait]
impl HealthProbe for DatabaseProbe {
    fn component(&self) -> &'static str {
        "database"
    }

    async fn check(&self) -> Result<(), String> {
        self.0.ping().await.map_err(|e| e.to_string())
    }
}

/// Collections backed by the `PostgreSQL` document table.
#[must_use]
pub fn postgres_stores(store: &PostgresStore) -> Stores {
    Stores {
        accounts: Arc::new(store.collection()),
        appointments: Arc::new(store.collection()),
        rates: Arc::new(store.collection()),
        services: Arc::new(store.collection()),
        blogs: Arc::new(store.collection()),
        people: Arc::new(store.collection()),
        vouchers: Arc::new(store.collection()),
        carts: Arc::new(store.collection()),
        orders: Arc::new(store.collection()),
        tasks: Arc::new(store.collection()),
        documents: Arc::new(store.collection()),
    }
}

/// Production gateways chosen by configuration.
///
/// # Errors
///
/// Fails when a configured provider cannot be built.
pub fn gateways(config: &Config) -> Result<Gateways> {
    let payments = RazorpayGateway::new(config.razorpay_config())
        .context("building Razorpay client")?;
    if !config.razorpay_config().is_configured() {
        tracing::warn!("Razorpay credentials are not set; paid bookings will be rejected");
    }

    let calendar: Arc<dyn CalendarGateway> = match config.google_calendar_config()? {
        Some(google) => {
            tracing::info!(calendar_id = %google.calendar_id, "Using Google Calendar");
            Arc::new(GoogleCalendarGateway::new(google).context("building Google Calendar client")?)
        }
        None => {
            tracing::info!("No calendar token; using office hours only");
            Arc::new(OfficeHoursCalendar::new(config.office_hours()?))
        }
    };

    let transport: Arc<dyn EmailTransport> = match config.smtp_config() {
        Some(smtp) => {
            tracing::info!(server = %smtp.server, port = smtp.port, "Using SMTP email");
            Arc::new(SmtpEmailTransport::new(smtp).context("building SMTP transport")?)
        }
        None => {
            tracing::info!("No SMTP server; emails are logged to the console");
            Arc::new(ConsoleEmailTransport::new())
        }
    };

    let storage = LocalDocumentStorage::new(
        config.storage.root.clone(),
        config.storage.public_base_url.clone(),
    )
    .with_policy(config.document_policy());

    Ok(Gateways {
        payments: Arc::new(payments),
        calendar,
        notifier: Arc::new(EmailNotifier::new(transport, config.server.brand.clone())),
        storage: Arc::new(storage),
    })
}

/// Connect, migrate and wire the application state.
///
/// # Errors
///
/// Fails when the database is unreachable, migrations fail or a provider
/// cannot be built.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let store = PostgresStore::connect(&config.postgres.url, config.postgres.max_connections)
        .await
        .context("connecting to PostgreSQL")?;
    store.migrate().await.context("running migrations")?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let settings = Settings {
        auth: config.auth_config(),
        booking: config.booking_config(),
    };
    let state = AppState::new(postgres_stores(&store), gateways(config)?, clock, settings)
        .with_readiness(Readiness::new().with_probe(Arc::new(DatabaseProbe(store))));
    Ok(state)
}
