use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use einvoice_sdk::{ApiResponse, Client, RetryRequest, Transmission};
use serde::Serialize;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::{info, warn};

use crate::AppState;
use crate::config::AppConfig;
use crate::dashboard::{DashboardQuery, TransmissionDashboard, TransmissionDetailView};

/// Build the console router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/dashboard/transmissions", get(transmission_dashboard))
        .route("/api/dashboard/transmissions/{id}", get(transmission_detail))
        .route(
            "/api/dashboard/transmissions/{id}/retry",
            post(retry_transmission),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the console service with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>, client: Client) -> anyhow::Result<()> {
    info!(
        name: "api.config.loaded",
        base_url = %config.api.base_url,
        authenticated = config.api.token.is_some(),
        "Platform API configuration loaded"
    );

    let state = AppState {
        client: Arc::new(client),
        config: Arc::clone(&config),
    };
    let app = router(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        name: "server.started",
        address = %format!("http://{address}"),
        "Server started"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    upstream: bool,
    /// Default FIRS environment used by this console.
    use_sandbox: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_error: Option<String>,
}

/// GET /health - this service is up; reports upstream reachability.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (upstream, upstream_error) = match state.client.health().await {
        Ok(health) => (health.is_healthy(), None),
        Err(err) => {
            warn!(name: "upstream.health.failed", error = %err, "Upstream health check failed");
            (false, Some(err.user_message()))
        }
    };
    Json(HealthResponse {
        status: "ok",
        upstream,
        use_sandbox: state.config.firs.use_sandbox,
        upstream_error,
    })
}

/// GET /api/dashboard/transmissions
async fn transmission_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Json<TransmissionDashboard> {
    Json(TransmissionDashboard::load(&state.client, &query).await)
}

/// GET /api/dashboard/transmissions/{id}
async fn transmission_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<TransmissionDetailView>) {
    let view = TransmissionDetailView::load(&state.client, &id).await;
    (envelope_status(&view.transmission), Json(view))
}

/// POST /api/dashboard/transmissions/{id}/retry - forwarded as-is; the
/// platform decides whether the retry is allowed.
async fn retry_transmission(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RetryRequest>,
) -> (StatusCode, Json<ApiResponse<Transmission>>) {
    info!(
        name: "transmission.retry.requested",
        transmission_id = %id,
        force = req.force,
        max_retries = ?req.max_retries,
        "Forwarding retry request"
    );
    let outcome: ApiResponse<Transmission> = state
        .client
        .transmissions()
        .retry_with_options(&id, &req)
        .await
        .into();
    if let Some(error) = &outcome.error {
        warn!(
            name: "transmission.retry.rejected",
            transmission_id = %id,
            status = outcome.status,
            error = %error,
            "Retry request failed"
        );
    }
    (envelope_status(&outcome), Json(outcome))
}

/// Upstream status is passed through; failures without one (no response)
/// become 502.
fn envelope_status<T>(envelope: &ApiResponse<T>) -> StatusCode {
    let status = StatusCode::from_u16(envelope.status).ok();
    if envelope.is_ok() {
        return status
            .filter(StatusCode::is_success)
            .unwrap_or(StatusCode::OK);
    }
    status
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed(status: u16) -> ApiResponse<()> {
        ApiResponse {
            data: None,
            error: Some("failed".into()),
            status,
        }
    }

    #[test]
    fn test_envelope_status_mapping() {
        let ok = ApiResponse {
            data: Some(()),
            error: None,
            status: 200,
        };
        assert_eq!(envelope_status(&ok), StatusCode::OK);
        let accepted = ApiResponse::ok_with_status((), 202);
        assert_eq!(envelope_status(&accepted), StatusCode::ACCEPTED);
        assert_eq!(envelope_status(&failed(404)), StatusCode::NOT_FOUND);
        assert_eq!(envelope_status(&failed(0)), StatusCode::BAD_GATEWAY);
        assert_eq!(envelope_status(&failed(302)), StatusCode::BAD_GATEWAY);
    }
}
