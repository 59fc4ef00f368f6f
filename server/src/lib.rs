//! # ClientDesk server
//!
//! HTTP backend for a small practice: appointment booking with online
//! payment, a service catalog with cart checkout, fulfilment tasks, document
//! uploads and account administration.
//!
//! The binary (`clientdesk`) loads [`Config`] from the environment, wires
//! [`AppState`] through [`bootstrap::build_state`] and serves
//! [`build_router`]. Tests build the same router over in-memory stores and
//! mock gateways.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::{RouterSettings, build_router};
pub use state::{AppState, Gateways, Settings, Stores};
