//! Transmission dashboard and detail view models.
//!
//! Panels are loaded concurrently and each keeps its own `{data, error,
//! status}` envelope with the upstream status.

use chrono::{DateTime, NaiveDate, Utc};
use einvoice_sdk::{
    ApiResponse, Client, Fetched, TimelineInterval, Transmission, TransmissionFilter, TransmissionHistory,
    TransmissionListQuery, TransmissionStatistics, TransmissionStatus, TransmissionTimeline,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::metrics::{
    format_elapsed, format_relative, format_timestamp, percentage, radial_degrees, round1,
};

/// Default number of rows in the "recent transmissions" table.
pub const DEFAULT_RECENT_LIMIT: u32 = 10;

// =============================================================================
// Query
// =============================================================================

/// Filters for the transmission dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardQuery {
    pub organization_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub interval: TimelineInterval,
    pub limit: Option<u32>,
}

impl DashboardQuery {
    pub fn filter(&self) -> TransmissionFilter {
        TransmissionFilter {
            organization_id: self.organization_id.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    fn list_query(&self) -> TransmissionListQuery {
        TransmissionListQuery {
            organization_id: self.organization_id.clone(),
            limit: Some(self.limit.unwrap_or(DEFAULT_RECENT_LIMIT)),
            ..Default::default()
        }
    }
}

// =============================================================================
// View Models
// =============================================================================

/// Headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryCards {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    /// Pending, in progress and retrying.
    pub in_flight: u64,
    /// Completed share of the total, in percent.
    pub completion_percent: f64,
    /// Server-reported success rate, in percent.
    pub success_percent: f64,
    /// Sweep angle for the success-rate ring.
    pub success_degrees: f64,
    pub average_retries: f64,
}

/// Count and share for one status.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusShare {
    pub status: TransmissionStatus,
    pub count: u64,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsPanel {
    pub summary: SummaryCards,
    pub breakdown: Vec<StatusShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub period: String,
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub success_percent: f64,
}

/// One line of the recent-transmissions table.
#[derive(Debug, Clone, Serialize)]
pub struct TransmissionRow {
    pub id: String,
    pub organization_id: String,
    pub status: TransmissionStatus,
    pub terminal: bool,
    pub retry_count: u32,
    pub created: String,
    pub age: String,
    pub last_retry: Option<String>,
}

impl StatisticsPanel {
    pub fn from_statistics(stats: &TransmissionStatistics) -> Self {
        Self {
            summary: summary_cards(stats),
            breakdown: status_breakdown(stats),
        }
    }
}

pub fn summary_cards(stats: &TransmissionStatistics) -> SummaryCards {
    SummaryCards {
        total: stats.total,
        completed: stats.completed,
        failed: stats.failed,
        in_flight: stats
            .pending
            .saturating_add(stats.in_progress)
            .saturating_add(stats.retrying),
        completion_percent: percentage(stats.completed, stats.total),
        success_percent: round1(if stats.success_rate.is_finite() {
            stats.success_rate.clamp(0.0, 1.0) * 100.0
        } else {
            0.0
        }),
        success_degrees: radial_degrees(stats.success_rate),
        average_retries: if stats.average_retries.is_finite() {
            stats.average_retries
        } else {
            0.0
        },
    }
}

pub fn status_breakdown(stats: &TransmissionStatistics) -> Vec<StatusShare> {
    TransmissionStatus::KNOWN
        .into_iter()
        .map(|status| {
            let count = stats.count(status);
            StatusShare {
                status,
                count,
                percent: percentage(count, stats.total),
            }
        })
        .collect()
}

pub fn timeline_rows(timeline: &TransmissionTimeline) -> Vec<TimelineRow> {
    timeline
        .timeline
        .iter()
        .map(|point| TimelineRow {
            period: point.period.clone(),
            total: point.total,
            completed: point.completed,
            failed: point.failed,
            success_percent: percentage(point.completed, point.total),
        })
        .collect()
}

pub fn transmission_row(t: &Transmission, now: DateTime<Utc>) -> TransmissionRow {
    TransmissionRow {
        id: t.id.clone(),
        organization_id: t.organization_id.clone(),
        status: t.status,
        terminal: t.status.is_terminal(),
        retry_count: t.retry_count,
        created: format_timestamp(t.created_at),
        age: format_relative(t.created_at, now),
        last_retry: t.last_retry_at.map(format_timestamp),
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// The transmission dashboard: statistics, timeline and recent list.
///
/// Each panel is fetched independently and carries its own
/// `{data, error, status}` envelope, so one failing endpoint leaves the
/// other panels intact.
#[derive(Debug, Clone, Serialize)]
pub struct TransmissionDashboard {
    pub interval: TimelineInterval,
    pub statistics: ApiResponse<StatisticsPanel>,
    pub timeline: ApiResponse<Vec<TimelineRow>>,
    pub recent: ApiResponse<Vec<TransmissionRow>>,
    pub generated_at: DateTime<Utc>,
}

impl TransmissionDashboard {
    pub async fn load(client: &Client, query: &DashboardQuery) -> Self {
        let filter = query.filter();
        let list_query = query.list_query();
        let api = client.transmissions();

        // Unordered; each fetch resolves on its own.
        let (statistics, timeline, recent) = tokio::join!(
            api.statistics(&filter),
            api.timeline(&filter, query.interval),
            api.list(&list_query),
        );

        let dashboard = Self::assemble(query.interval, statistics, timeline, recent, Utc::now());
        info!(
            name: "dashboard.transmissions.loaded",
            statistics_ok = dashboard.statistics.is_ok(),
            timeline_ok = dashboard.timeline.is_ok(),
            recent_ok = dashboard.recent.is_ok(),
            "Transmission dashboard loaded"
        );
        dashboard
    }

    /// Build the view from already-fetched results.
    pub fn assemble(
        interval: TimelineInterval,
        statistics: einvoice_sdk::error::Result<Fetched<TransmissionStatistics>>,
        timeline: einvoice_sdk::error::Result<Fetched<TransmissionTimeline>>,
        recent: einvoice_sdk::error::Result<Fetched<Vec<Transmission>>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            interval,
            statistics: statistics
                .map(|f| f.map(|s| StatisticsPanel::from_statistics(&s)))
                .into(),
            timeline: timeline.map(|f| f.map(|t| timeline_rows(&t))).into(),
            recent: recent
                .map(|f| f.map(|items| items.iter().map(|t| transmission_row(t, now)).collect()))
                .into(),
            generated_at: now,
        }
    }
}

// =============================================================================
// Detail
// =============================================================================

/// One step in the history timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub timestamp: String,
    pub status: TransmissionStatus,
    pub message: Option<String>,
    /// Time since the previous event; `None` for the first.
    pub since_previous: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransmissionDetailView {
    pub transmission: ApiResponse<Transmission>,
    pub history: ApiResponse<Vec<HistoryRow>>,
}

/// Chronological history rows. Events are sorted by timestamp since the
/// server does not promise an order.
pub fn history_rows(history: &TransmissionHistory) -> Vec<HistoryRow> {
    let mut events: Vec<_> = history.history.iter().collect();
    events.sort_by_key(|e| e.timestamp);

    let mut previous: Option<DateTime<Utc>> = None;
    events
        .into_iter()
        .map(|event| {
            let row = HistoryRow {
                timestamp: format_timestamp(event.timestamp),
                status: event.status,
                message: event.message.clone(),
                since_previous: previous.map(|p| format_elapsed(p, event.timestamp)),
            };
            previous = Some(event.timestamp);
            row
        })
        .collect()
}

impl TransmissionDetailView {
    pub async fn load(client: &Client, id: &str) -> Self {
        let api = client.transmissions();
        let (transmission, history) = tokio::join!(api.get(id), api.history(id));

        if let Err(err) = &transmission {
            warn!(
                name: "dashboard.transmission.fetch_failed",
                transmission_id = %id,
                error = %err,
                "Failed to fetch transmission"
            );
        }

        Self {
            transmission: transmission.into(),
            history: history.map(|f| f.map(|h| history_rows(&h))).into(),
        }
    }
}
