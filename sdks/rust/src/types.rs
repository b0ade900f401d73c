//! Shared types for the SDK.
//!
//! These types mirror the platform's API DTOs. Decoding is lenient: unknown
//! fields are ignored and most counters default to zero, since the server
//! owns these records and may grow them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Transmission Types
// =============================================================================

/// Lifecycle state of a transmission.
///
/// Transitions happen server-side only. Unrecognized values decode to
/// [`TransmissionStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransmissionStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Retrying,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl TransmissionStatus {
    /// The statuses the platform documents, in lifecycle order.
    pub const KNOWN: [Self; 6] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Failed,
        Self::Retrying,
        Self::Canceled,
    ];

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Retrying => "retrying",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }

    /// Completed and canceled transmissions are not expected to change again.
    /// Informational only; the server may still move them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Canceled)
    }
}

impl fmt::Display for TransmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransmissionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::KNOWN
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown transmission status: {s}"))
    }
}

/// A tracked attempt to deliver a signed invoice payload to FIRS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transmission {
    /// Unique identifier.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Certificate used to sign the payload.
    #[serde(default)]
    pub certificate_id: Option<String>,
    /// Originating invoice submission.
    #[serde(default)]
    pub submission_id: Option<String>,
    /// Current status as last reported by the server.
    pub status: TransmissionStatus,
    /// Number of retries performed so far.
    #[serde(default)]
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_retry_at: Option<DateTime<Utc>>,
    /// Encrypted invoice payload (base64).
    #[serde(default)]
    pub encrypted_payload: Option<String>,
    #[serde(default)]
    pub encryption_metadata: Option<Value>,
    #[serde(default)]
    pub transmission_metadata: Option<Value>,
    /// Raw response from FIRS, if any.
    #[serde(default)]
    pub response_data: Option<Value>,
    #[serde(default)]
    pub debug_info: Option<Value>,
}

/// Aggregated transmission counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionStatistics {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub failed: u64,
    pub retrying: u64,
    pub canceled: u64,
    /// Fraction of transmissions completed, `0.0..=1.0`.
    pub success_rate: f64,
    pub average_retries: f64,
}

impl TransmissionStatistics {
    /// Count for a single status.
    pub fn count(&self, status: TransmissionStatus) -> u64 {
        match status {
            TransmissionStatus::Pending => self.pending,
            TransmissionStatus::InProgress => self.in_progress,
            TransmissionStatus::Completed => self.completed,
            TransmissionStatus::Failed => self.failed,
            TransmissionStatus::Retrying => self.retrying,
            TransmissionStatus::Canceled => self.canceled,
            TransmissionStatus::Unknown => 0,
        }
    }
}

/// Bucket size for timeline queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineInterval {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

impl TimelineInterval {
    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for TimelineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimelineInterval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(format!(
                "invalid interval `{other}` (expected hour, day, week or month)"
            )),
        }
    }
}

/// One timeline bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelinePoint {
    /// Period label as produced by the server (e.g. `2024-05-01`).
    pub period: String,
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub pending: u64,
    pub retrying: u64,
}

/// Bucketed transmission counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionTimeline {
    pub interval: Option<TimelineInterval>,
    pub timeline: Vec<TimelinePoint>,
}

/// Filters shared by the statistics and timeline queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// Query for `GET /transmissions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransmissionListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransmissionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// One entry in a transmission's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransmissionHistoryEvent {
    pub timestamp: DateTime<Utc>,
    pub status: TransmissionStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}

/// Response of `GET /transmissions/{id}/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransmissionHistory {
    pub transmission_id: String,
    #[serde(default)]
    pub history: Vec<TransmissionHistoryEvent>,
}

/// Body of `POST /transmissions/{id}/retry`.
///
/// `force` is always sent; the remaining fields only when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryRequest {
    pub force: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Delay before the retry, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `POST /transmissions/batch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchUpdateRequest {
    pub transmission_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransmissionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transmission_metadata: Option<Value>,
}

/// Result of a batch update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchUpdateResponse {
    pub updated_count: u64,
    pub failed_ids: Vec<String>,
}

// =============================================================================
// FIRS Types
// =============================================================================

/// Body of `POST /api/firs/submit-invoice`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitInvoiceRequest {
    /// Invoice document as accepted by FIRS.
    pub invoice: Value,
    pub use_sandbox: bool,
}

/// Body of `POST /api/firs/batch-submit`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSubmitRequest {
    pub invoices: Vec<Value>,
    pub use_sandbox: bool,
}

/// Outcome of an invoice submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionResponse {
    pub success: bool,
    pub submission_id: Option<String>,
    pub irn: Option<String>,
    pub message: Option<String>,
    pub errors: Vec<Value>,
}

/// Outcome of a batch submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSubmissionResponse {
    pub success: bool,
    pub batch_id: Option<String>,
    pub submitted: u64,
    pub failed: u64,
    pub results: Vec<SubmissionResponse>,
}

/// Response of `GET /api/firs/submission-status/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionStatus {
    pub submission_id: String,
    pub status: String,
    pub irn: Option<String>,
    pub message: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Display Record Types
// =============================================================================

/// An issued signing certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub valid_to: Option<DateTime<Utc>>,
}

/// A pending or processed certificate signing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificateRequest {
    pub id: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub request_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Cryptographic stamp identifier bound to a certificate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Csid {
    pub id: String,
    #[serde(default)]
    pub csid: Option<String>,
    #[serde(default)]
    pub certificate_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// An ERP integration and its sync state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub integration_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

/// IRN generation/validation status row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrnStatusItem {
    pub irn: String,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Optional organization filter for record listings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

// =============================================================================
// Health
// =============================================================================

/// Response of `GET /health`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthStatus {
    pub status: String,
    pub version: Option<String>,
}

impl HealthStatus {
    /// Whether the server reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy" | "up")
    }
}
