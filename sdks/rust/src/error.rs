//! Error types for the SDK.
//!
//! Every failure is classified by HTTP outcome:
//!
//! - [`ErrorKind::Server`]: the server answered with a non-success status.
//!   The message is taken from the response body when the server supplied
//!   one (see [`format_error_body`]).
//! - [`ErrorKind::Network`]: no response arrived (connect failure, timeout).
//! - [`ErrorKind::Client`]: something failed locally (bad URL, bad header,
//!   undecodable body).
//!
//! None of these are retried by the SDK. Callers surface them and let the
//! user re-issue the action.

use std::ops::Deref;

use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Message shown for failures where the server never answered.
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to reach the server. Check your network connection and try again.";

/// SDK error type.
#[derive(Error, Debug)]
pub enum Error {
    /// The server returned an error response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The request never produced a response.
    #[error("network error: {0}")]
    #[cfg(feature = "http-client")]
    Network(reqwest::Error),

    /// Request building or response decoding failed locally.
    #[error("HTTP error: {0}")]
    #[cfg(feature = "http-client")]
    Http(reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An identifier cannot be used as a URL path segment.
    #[error("invalid path segment: {0:?}")]
    InvalidPathSegment(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bearer token could not be encoded as a header value.
    #[error("invalid header value: {0}")]
    #[cfg(feature = "http-client")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

#[cfg(feature = "http-client")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || (err.is_request() && err.status().is_none()) {
            Self::Network(err)
        } else {
            Self::Http(err)
        }
    }
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Server error response.
    Server,
    /// No response received.
    Network,
    /// Local failure.
    Client,
}

impl Error {
    /// Classify this error by HTTP outcome.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Api { .. } => ErrorKind::Server,
            #[cfg(feature = "http-client")]
            Self::Network(_) => ErrorKind::Network,
            _ => ErrorKind::Client,
        }
    }

    /// HTTP status of a server error response, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for showing to a user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            _ if self.kind() == ErrorKind::Network => NETWORK_ERROR_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Extract the user-facing message from an error response body.
///
/// Lookup order: `detail.message`, `detail` (when a string), `message`,
/// `error` (when a string). Anything else falls back to generic text built
/// from the status code.
pub fn format_error_body(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = server_message(&value) {
            return message;
        }
    }
    generic_status_message(status)
}

fn server_message(value: &Value) -> Option<String> {
    let non_empty = |v: &Value| {
        v.as_str()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    };

    if let Some(detail) = value.get("detail") {
        if let Some(message) = detail.get("message").and_then(non_empty) {
            return Some(message);
        }
        if let Some(message) = non_empty(detail) {
            return Some(message);
        }
    }
    value
        .get("message")
        .and_then(non_empty)
        .or_else(|| value.get("error").and_then(non_empty))
}

/// Generic text for a status code with no usable server message.
pub fn generic_status_message(status: u16) -> String {
    match reason_phrase(status) {
        Some(reason) => format!("Request failed with status {status} ({reason})"),
        None => format!("Request failed with status {status}"),
    }
}

fn reason_phrase(status: u16) -> Option<&'static str> {
    Some(match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => return None,
    })
}

/// A decoded success body and the HTTP status it arrived with.
///
/// Derefs to the body, and serializes as the body alone. A body field that
/// is itself named `data` or `status` has to be reached through `.data`.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub data: T,
    pub status: u16,
}

impl<T> Fetched<T> {
    pub fn into_data(self) -> T {
        self.data
    }

    /// Transform the body, keeping the status.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            status: self.status,
        }
    }
}

impl<T> Deref for Fetched<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T: Serialize> Serialize for Fetched<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.data.serialize(serializer)
    }
}

/// Uniform `{data, error, status}` envelope.
///
/// `status` is the HTTP status of the exchange, or `0` when no response was
/// received or the failure happened locally.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    /// Payload on success.
    pub data: Option<T>,
    /// User-facing error text on failure.
    pub error: Option<String>,
    /// HTTP status, `0` when there was none.
    pub status: u16,
}

impl<T> ApiResponse<T> {
    /// Successful envelope carrying the upstream status.
    pub fn ok_with_status(data: T, status: u16) -> Self {
        Self {
            data: Some(data),
            error: None,
            status,
        }
    }

    /// Whether the exchange succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl<T> From<Error> for ApiResponse<T> {
    fn from(err: Error) -> Self {
        Self {
            data: None,
            error: Some(err.user_message()),
            status: err.status().unwrap_or(0),
        }
    }
}

impl<T> From<Result<Fetched<T>>> for ApiResponse<T> {
    fn from(result: Result<Fetched<T>>) -> Self {
        match result {
            Ok(Fetched { data, status }) => Self::ok_with_status(data, status),
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message_wins() {
        let body = r#"{"detail": {"message": "Maximum retry attempts exceeded", "code": "E_MAX"}, "message": "other"}"#;
        assert_eq!(
            format_error_body(400, body),
            "Maximum retry attempts exceeded"
        );
    }

    #[test]
    fn test_detail_string_and_message_fallbacks() {
        assert_eq!(
            format_error_body(404, r#"{"detail": "Transmission not found"}"#),
            "Transmission not found"
        );
        assert_eq!(
            format_error_body(500, r#"{"message": "Database unavailable"}"#),
            "Database unavailable"
        );
        assert_eq!(
            format_error_body(401, r#"{"error": "token expired"}"#),
            "token expired"
        );
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(
            format_error_body(503, "<html>down</html>"),
            "Request failed with status 503 (Service Unavailable)"
        );
        assert_eq!(
            format_error_body(418, r#"{"detail": {"code": 1}}"#),
            "Request failed with status 418"
        );
        assert_eq!(
            format_error_body(500, r#"{"detail": {"message": "  "}}"#),
            "Request failed with status 500 (Internal Server Error)"
        );
    }

    #[test]
    fn test_api_error_envelope() {
        let envelope = ApiResponse::<u32>::from(Error::Api {
            status: 409,
            message: "Transmission already completed".into(),
        });
        assert!(!envelope.is_ok());
        assert!(envelope.data.is_none());
        assert_eq!(envelope.status, 409);
        assert_eq!(
            envelope.error.as_deref(),
            Some("Transmission already completed")
        );
    }

    #[test]
    fn test_ok_envelope_keeps_upstream_status() {
        let fetched = Fetched {
            data: 7_u32,
            status: 202,
        };
        let envelope = ApiResponse::from(Ok::<_, Error>(fetched.map(|n| n * 2)));
        assert!(envelope.is_ok());
        assert_eq!(envelope.data, Some(14));
        assert_eq!(envelope.status, 202);
    }

    #[test]
    fn test_fetched_serializes_as_body() {
        let fetched = Fetched {
            data: serde_json::json!({ "id": "tx-1" }),
            status: 201,
        };
        assert_eq!(fetched["id"], "tx-1");
        assert_eq!(
            serde_json::to_string(&fetched).unwrap(),
            r#"{"id":"tx-1"}"#
        );
    }

    #[test]
    fn test_client_error_kind() {
        let err = Error::from(serde_json::from_str::<Value>("{").unwrap_err());
        assert_eq!(err.kind(), ErrorKind::Client);
        assert_ne!(err.user_message(), NETWORK_ERROR_MESSAGE);
        assert_eq!(ApiResponse::<()>::from(err).status, 0);
    }
}
