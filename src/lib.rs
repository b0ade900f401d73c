//! E-invoice transmission console
//!
//! Operator tooling for a FIRS e-invoicing Access Point: inspect transmission
//! statistics and timelines, drill into a transmission's history, request
//! retries, submit invoices and browse certificates, CSIDs, integrations and
//! IRN status.
//!
//! # Architecture
//!
//! - **SDK** (`einvoice-sdk`): typed HTTP client for the platform API
//! - **Dashboard**: view models and display arithmetic over fetched data
//! - **Server**: Axum JSON service exposing the dashboard views
//! - **CLI**: one-shot commands against the platform API
//!
//! Transmission state is owned by the platform. This crate only reads it
//! and forwards retry requests.
//!
//! # Modules
//!
//! - [`cli`]: command-line interface
//! - [`config`]: layered configuration (defaults, file, env, flags)
//! - [`dashboard`]: dashboard view models
//! - [`server`]: console HTTP service
//! - [`telemetry`]: tracing setup

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod server;
pub mod telemetry;

use crate::config::AppConfig;

use einvoice_sdk::Client;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Platform API client.
    pub client: Arc<Client>,
    /// Global Configuration
    pub config: Arc<AppConfig>,
}

/// Build a platform client from configuration.
pub fn build_client(config: &AppConfig) -> einvoice_sdk::error::Result<Client> {
    Client::builder(&config.api.base_url)
        .maybe_bearer_token(config.api.token.clone())
        .timeout(config.api.timeout())
        .user_agent(concat!("einvoice-console/", env!("CARGO_PKG_VERSION")))
        .build()
}
