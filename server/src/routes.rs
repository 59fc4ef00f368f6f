//! Router configuration.
//!
//! Builds the complete Axum router: health checks at the root, everything
//! else under `/api`.

use crate::api::{accounts, appointments, cart, catalog, documents, rates, tasks, vouchers};
use crate::state::AppState;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    routing::{delete, get, patch, post},
};
use clientdesk_web::handlers::{health_check, readiness_check};
use clientdesk_web::middleware::correlation_id;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Multipart framing allowance on top of the file limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Router-level settings.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Allowed CORS origins; empty allows any.
    pub cors_origins: Vec<String>,
    /// Largest accepted upload.
    pub max_upload_bytes: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Build the complete Axum router.
pub fn build_router(state: AppState, settings: &RouterSettings) -> Router {
    let upload_limit = settings.max_upload_bytes + MULTIPART_OVERHEAD;

    let api_routes = Router::new()
        // Appointments
        .route(
            "/appointment",
            post(appointments::create).get(appointments::list),
        )
        .route(
            "/appointment/verify-payment",
            post(appointments::verify_payment),
        )
        .route("/appointment/webhook", post(appointments::webhook))
        .route(
            "/appointment/availability",
            get(appointments::availability),
        )
        .route("/appointment/:id", get(appointments::get))
        .route("/appointment/:id/cancel", patch(appointments::cancel))
        .route(
            "/appointment/:id/reschedule",
            patch(appointments::reschedule),
        )
        .route("/appointment/:id/complete", patch(appointments::complete))
        .route("/appointment/:id/no-show", patch(appointments::no_show))
        .route("/appointment/:id/refund", post(appointments::refund))
        // Hourly rate
        .route("/hourly-rate", get(rates::current).post(rates::set))
        .route("/hourly-rate/history", get(rates::history))
        // Catalog
        .route(
            "/services",
            get(catalog::list_services).post(catalog::create_service),
        )
        .route(
            "/services/:id",
            get(catalog::get_service)
                .put(catalog::update_service)
                .delete(catalog::delete_service),
        )
        .route(
            "/blogs",
            get(catalog::list_blogs).post(catalog::create_blog),
        )
        .route(
            "/blogs/:id",
            get(catalog::get_blog)
                .put(catalog::update_blog)
                .delete(catalog::delete_blog),
        )
        .route(
            "/people",
            get(catalog::list_people).post(catalog::create_person),
        )
        .route(
            "/people/:id",
            get(catalog::get_person)
                .put(catalog::update_person)
                .delete(catalog::delete_person),
        )
        // Vouchers
        .route("/vouchers", get(vouchers::list).post(vouchers::create))
        .route("/vouchers/validate", post(vouchers::validate))
        .route(
            "/vouchers/:id",
            axum::routing::put(vouchers::update).delete(vouchers::delete),
        )
        // Cart and checkout
        .route("/cart", get(cart::get))
        .route("/cart/items", post(cart::add_item))
        .route("/cart/items/:service_id", delete(cart::remove_item))
        .route("/cart/checkout", post(cart::checkout))
        .route("/cart/verify-payment", post(cart::verify_payment))
        .route("/cart/orders", get(cart::orders))
        // Tasks
        .route("/tasks", get(tasks::list))
        .route(
            "/tasks/:id",
            get(tasks::get).patch(tasks::update).delete(tasks::delete),
        )
        // Documents
        .route(
            "/documents",
            post(documents::upload)
                .get(documents::list)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/documents/:id", delete(documents::delete))
        // Accounts
        .route("/auth/signup", post(accounts::signup))
        .route("/auth/login", post(accounts::login))
        .route("/auth/reset-password", post(accounts::reset_password))
        .route("/auth/update-password", post(accounts::update_password))
        .route("/auth/me", get(accounts::me))
        .route("/admin/setup", post(accounts::setup))
        .route("/admin/create-admin", post(accounts::create_admin))
        .route("/admin/users", get(accounts::list_users))
        .route("/admin/users/:id/status", patch(accounts::set_status));

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(RequestBodyLimitLayer::new(upload_limit))
        .layer(cors_layer(&settings.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
