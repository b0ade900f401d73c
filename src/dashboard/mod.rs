//! Dashboard view models.
//!
//! Everything here is derived from data the platform API returns. Nothing
//! is authoritative: statuses and counts are displayed as the server
//! reported them, with the arithmetic (shares, rates, ring angles, date
//! labels) guarded so empty data never yields `NaN`.
//!
//! # Architecture
//!
//! - [`metrics`]: percentage, ratio, angle and date helpers
//! - [`transmissions`]: dashboard and detail view models, loaded with
//!   concurrent independent fetches
//! - [`render`]: plain-text rendering for the CLI

pub mod metrics;
pub mod render;
pub mod transmissions;

pub use transmissions::{DashboardQuery, TransmissionDashboard, TransmissionDetailView};
