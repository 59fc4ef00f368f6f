//! Handlers shared by every deployment.

pub mod health;

pub use health::{HealthProbe, Readiness, health_check, readiness_check};
