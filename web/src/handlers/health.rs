//! Health check endpoints.
//!
//! These endpoints are used by load balancers and monitoring systems
//! to verify service health.

use async_trait::async_trait;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use std::sync::Arc;

/// A dependency that must answer before the service takes traffic.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Short component name, e.g. `database`.
    fn component(&self) -> &'static str;

    /// Check the dependency.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure.
    async fn check(&self) -> Result<(), String>;
}

/// The probes consulted by [`readiness_check`].
#[derive(Clone, Default)]
pub struct Readiness {
    probes: Vec<Arc<dyn HealthProbe>>,
}

impl Readiness {
    /// No probes; always ready.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a probe.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<dyn HealthProbe>) -> Self {
        self.probes.push(probe);
        self
    }
}

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Simple health check endpoint (for basic liveness).
///
/// Does NOT check dependencies.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// One probe result.
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    /// Probe name.
    pub component: &'static str,
    /// Whether it answered.
    pub healthy: bool,
    /// Failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Readiness response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// All probes healthy.
    pub ready: bool,
    /// Per-probe results.
    pub components: Vec<ComponentStatus>,
}

/// Readiness check endpoint.
///
/// Returns 200 when every probe answers, 503 otherwise.
///
/// # Endpoint
///
/// ```text
/// GET /ready
/// ```
pub async fn readiness_check(
    State(readiness): State<Readiness>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let mut components = Vec::with_capacity(readiness.probes.len());
    for probe in &readiness.probes {
        let result = probe.check().await;
        if let Err(message) = &result {
            tracing::warn!(component = probe.component(), error = %message, "Readiness probe failed");
        }
        components.push(ComponentStatus {
            component: probe.component(),
            healthy: result.is_ok(),
            message: result.err(),
        });
    }

    let ready = components.iter().all(|c| c.healthy);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadinessResponse { ready, components }))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<(), String>);

    #[async_trait]
    impl HealthProbe for Fixed {
        fn component(&self) -> &'static str {
            "database"
        }

        async fn check(&self) -> Result<(), String> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, Json(body)) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn ready_when_every_probe_answers() {
        let readiness = Readiness::new().with_probe(Arc::new(Fixed(Ok(()))));
        let (status, Json(body)) = readiness_check(State(readiness)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.ready);
        assert_eq!(body.components.len(), 1);
    }

    #[tokio::test]
    async fn unavailable_when_a_probe_fails() {
        let readiness = Readiness::new()
            .with_probe(Arc::new(Fixed(Ok(()))))
            .with_probe(Arc::new(Fixed(Err("connection refused".into()))));
        let (status, Json(body)) = readiness_check(State(readiness)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.ready);
        assert_eq!(body.components[1].message.as_deref(), Some("connection refused"));
    }
}
