//! HTTP client for the e-invoicing platform API.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::{
    error::{Error, Fetched, Result, format_error_body},
    types::*,
};

const TRANSMISSIONS_PATH: &str = "/api/v1/transmissions";
const RECORDS_PREFIX: &str = "/api/v1";
const FIRS_PREFIX: &str = "/api/firs";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the API.
///
/// # Example
///
/// ```rust,no_run
/// use einvoice_sdk::{Client, TimelineInterval, TransmissionFilter};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder("http://localhost:8000")
///     .bearer_token("secret")
///     .build()?;
///
/// let stats = client
///     .transmissions()
///     .statistics(&TransmissionFilter::default())
///     .await?;
/// println!("{} transmissions", stats.total);
///
/// let timeline = client
///     .transmissions()
///     .timeline(&TransmissionFilter::default(), TimelineInterval::Week)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

/// Builder for [`Client`].
#[derive(Clone)]
pub struct ClientBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientBuilder {
    /// Attach `Authorization: Bearer <token>` to every request.
    ///
    /// Blank tokens are ignored.
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.trim().is_empty()).then_some(token);
        self
    }

    /// Same as [`ClientBuilder::bearer_token`] for an optional token.
    pub fn maybe_bearer_token(self, token: Option<String>) -> Self {
        match token {
            Some(token) => self.bearer_token(token),
            None => self,
        }
    }

    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<Client> {
        let base_url = Url::parse(&self.base_url)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(self.timeout);
        if let Some(user_agent) = self.user_agent {
            http = http.user_agent(user_agent);
        }

        Ok(Client {
            base_url,
            http: http.build().map_err(Error::Http)?,
        })
    }
}

impl Client {
    /// Create a new client without authentication.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the platform API (e.g., "http://localhost:8000")
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::builder(base_url).build()
    }

    /// Start configuring a client.
    pub fn builder(base_url: impl AsRef<str>) -> ClientBuilder {
        ClientBuilder {
            base_url: base_url.as_ref().to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the Transmissions API.
    pub fn transmissions(&self) -> TransmissionsApi<'_> {
        TransmissionsApi { client: self }
    }

    /// Access the FIRS submission API.
    pub fn firs(&self) -> FirsApi<'_> {
        FirsApi { client: self }
    }

    /// Access the display-record listings.
    pub fn records(&self) -> RecordsApi<'_> {
        RecordsApi { client: self }
    }

    /// Connectivity check against `GET /health`.
    pub async fn health(&self) -> Result<Fetched<HealthStatus>> {
        self.get(self.endpoint("/health", &[])?, &()).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Resolve `path` against the base URL and append each of `segments` as
    /// a single percent-encoded path segment.
    fn endpoint(&self, path: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if segments.is_empty() {
            return Ok(url);
        }
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(Error::InvalidPathSegment((*bad).to_string()));
        }
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T, Q>(&self, url: Url, query: &Q) -> Result<Fetched<T>>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!(name: "api.request", method = "GET", path = url.path(), "Sending request");
        let response = self.http.get(url).query(query).send().await?;
        Self::handle_response(response).await
    }

    async fn post<T, B>(&self, url: Url, body: &B) -> Result<Fetched<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(name: "api.request", method = "POST", path = url.path(), "Sending request");
        let response = self.http.post(url).json(body).send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Fetched<T>> {
        let status = response.status();
        if status.is_success() {
            Ok(Fetched {
                data: response.json().await?,
                status: status.as_u16(),
            })
        } else {
            let body = response.text().await.unwrap_or_default();
            let message = format_error_body(status.as_u16(), &body);
            debug!(
                name: "api.response.error",
                status = status.as_u16(),
                message = %message,
                "Request failed"
            );
            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

// =============================================================================
// Transmissions API
// =============================================================================

/// Transmissions API client.
///
/// Read-only views of server-owned transmission state, plus the two
/// mutating requests (retry, batch update). The server decides whether a
/// retry is allowed.
#[derive(Debug)]
pub struct TransmissionsApi<'a> {
    client: &'a Client,
}

#[derive(Serialize)]
struct TimelineQuery<'q> {
    interval: TimelineInterval,
    #[serde(flatten)]
    filter: &'q TransmissionFilter,
}

impl<'a> TransmissionsApi<'a> {
    /// Aggregated counts and success rate.
    pub async fn statistics(
        &self,
        filter: &TransmissionFilter,
    ) -> Result<Fetched<TransmissionStatistics>> {
        let url = self.client.endpoint(TRANSMISSIONS_PATH, &["statistics"])?;
        self.client.get(url, filter).await
    }

    /// Counts bucketed by `interval`.
    pub async fn timeline(
        &self,
        filter: &TransmissionFilter,
        interval: TimelineInterval,
    ) -> Result<Fetched<TransmissionTimeline>> {
        let url = self.client.endpoint(TRANSMISSIONS_PATH, &["timeline"])?;
        let query = TimelineQuery { interval, filter };
        self.client.get(url, &query).await
    }

    /// List transmissions.
    pub async fn list(&self, query: &TransmissionListQuery) -> Result<Fetched<Vec<Transmission>>> {
        let url = self.client.endpoint(TRANSMISSIONS_PATH, &[])?;
        self.client.get(url, query).await
    }

    /// Get a transmission by ID.
    pub async fn get(&self, id: &str) -> Result<Fetched<Transmission>> {
        let url = self.client.endpoint(TRANSMISSIONS_PATH, &[id])?;
        self.client.get(url, &()).await
    }

    /// Status history for a transmission.
    pub async fn history(&self, id: &str) -> Result<Fetched<TransmissionHistory>> {
        let url = self.client.endpoint(TRANSMISSIONS_PATH, &[id, "history"])?;
        self.client.get(url, &()).await
    }

    /// Ask the server to retry a transmission with default options
    /// (`force: false`).
    pub async fn retry(&self, id: &str) -> Result<Fetched<Transmission>> {
        self.retry_with_options(id, &RetryRequest::default()).await
    }

    /// Ask the server to retry a transmission.
    pub async fn retry_with_options(
        &self,
        id: &str,
        req: &RetryRequest,
    ) -> Result<Fetched<Transmission>> {
        let url = self.client.endpoint(TRANSMISSIONS_PATH, &[id, "retry"])?;
        debug!(
            name: "transmission.retry.requested",
            transmission_id = %id,
            force = req.force,
            "Requesting transmission retry"
        );
        self.client.post(url, req).await
    }

    /// Update several transmissions at once.
    pub async fn batch_update(
        &self,
        req: &BatchUpdateRequest,
    ) -> Result<Fetched<BatchUpdateResponse>> {
        let url = self.client.endpoint(TRANSMISSIONS_PATH, &["batch"])?;
        self.client.post(url, req).await
    }
}

// =============================================================================
// FIRS API
// =============================================================================

/// FIRS invoice submission client.
#[derive(Debug)]
pub struct FirsApi<'a> {
    client: &'a Client,
}

#[derive(Serialize)]
struct SandboxQuery {
    use_sandbox: bool,
}

impl<'a> FirsApi<'a> {
    /// Submit a single invoice.
    pub async fn submit_invoice(
        &self,
        invoice: Value,
        use_sandbox: bool,
    ) -> Result<Fetched<SubmissionResponse>> {
        let url = self.client.endpoint(FIRS_PREFIX, &["submit-invoice"])?;
        let req = SubmitInvoiceRequest {
            invoice,
            use_sandbox,
        };
        self.client.post(url, &req).await
    }

    /// Current status of a submission.
    pub async fn submission_status(
        &self,
        submission_id: &str,
        use_sandbox: bool,
    ) -> Result<Fetched<SubmissionStatus>> {
        let url = self
            .client
            .endpoint(FIRS_PREFIX, &["submission-status", submission_id])?;
        self.client.get(url, &SandboxQuery { use_sandbox }).await
    }

    /// Submit several invoices in one request.
    pub async fn batch_submit(
        &self,
        invoices: Vec<Value>,
        use_sandbox: bool,
    ) -> Result<Fetched<BatchSubmissionResponse>> {
        let url = self.client.endpoint(FIRS_PREFIX, &["batch-submit"])?;
        let req = BatchSubmitRequest {
            invoices,
            use_sandbox,
        };
        self.client.post(url, &req).await
    }
}

// =============================================================================
// Records API
// =============================================================================

/// Flat display records (certificates, CSIDs, integrations, IRN status).
#[derive(Debug)]
pub struct RecordsApi<'a> {
    client: &'a Client,
}

impl<'a> RecordsApi<'a> {
    pub async fn certificates(&self, query: &RecordQuery) -> Result<Fetched<Vec<Certificate>>> {
        let url = self.client.endpoint(RECORDS_PREFIX, &["certificates"])?;
        self.client.get(url, query).await
    }

    pub async fn certificate_requests(
        &self,
        query: &RecordQuery,
    ) -> Result<Fetched<Vec<CertificateRequest>>> {
        let url = self
            .client
            .endpoint(RECORDS_PREFIX, &["certificates", "requests"])?;
        self.client.get(url, query).await
    }

    pub async fn csids(&self, query: &RecordQuery) -> Result<Fetched<Vec<Csid>>> {
        let url = self.client.endpoint(RECORDS_PREFIX, &["csids"])?;
        self.client.get(url, query).await
    }

    pub async fn integrations(&self, query: &RecordQuery) -> Result<Fetched<Vec<Integration>>> {
        let url = self.client.endpoint(RECORDS_PREFIX, &["integrations"])?;
        self.client.get(url, query).await
    }

    /// IRN status items.
    pub async fn irn_status(&self, query: &RecordQuery) -> Result<Fetched<Vec<IrnStatusItem>>> {
        let url = self.client.endpoint(RECORDS_PREFIX, &["irn", "status"])?;
        self.client.get(url, query).await
    }
}
