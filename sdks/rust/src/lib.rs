//! Rust SDK for the e-invoicing transmission platform.
//!
//! Typed async access to:
//!
//! - the **Transmissions API** (statistics, timeline, list, detail, history,
//!   retry, batch update),
//! - the **FIRS API** (invoice submission, submission status, batch submit),
//! - the **display records** (certificates, CSIDs, integrations, IRN status),
//! - the `/health` connectivity check.
//!
//! Transmission state lives on the server. The SDK reads it and forwards
//! retry requests; it never decides whether a retry is allowed.
//!
//! ```rust,no_run
//! use einvoice_sdk::{ApiResponse, Client, RetryRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new("http://localhost:8000")?;
//!
//!     let retry = RetryRequest {
//!         max_retries: Some(3),
//!         ..Default::default()
//!     };
//!     let outcome: ApiResponse<_> = client
//!         .transmissions()
//!         .retry_with_options("tx-42", &retry)
//!         .await
//!         .into();
//!     match outcome.error {
//!         Some(message) => eprintln!("retry refused: {message}"),
//!         None => println!("retry queued"),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod types;

#[cfg(feature = "http-client")]
pub mod client;

// Re-exports
pub use error::{ApiResponse, Error, ErrorKind, Fetched, NETWORK_ERROR_MESSAGE, format_error_body};
pub use types::*;

#[cfg(feature = "http-client")]
pub use client::Client;
