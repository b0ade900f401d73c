//! Plain-text rendering of dashboard views for terminal output.

use std::fmt::Write;

use einvoice_sdk::ApiResponse;

use super::transmissions::{TransmissionDashboard, TransmissionDetailView};

fn unavailable<T>(out: &mut String, panel: &ApiResponse<T>) {
    let message = panel.error.as_deref().unwrap_or("no data");
    if panel.status == 0 {
        let _ = writeln!(out, "  unavailable: {message}");
    } else {
        let _ = writeln!(out, "  unavailable ({}): {message}", panel.status);
    }
}

pub fn render_dashboard(dashboard: &TransmissionDashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Transmissions (generated {})",
        dashboard.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    out.push_str("\nSummary\n");
    match &dashboard.statistics.data {
        Some(panel) => {
            let s = &panel.summary;
            let _ = writeln!(
                out,
                "  total {}  completed {}  failed {}  in flight {}",
                s.total, s.completed, s.failed, s.in_flight
            );
            let _ = writeln!(
                out,
                "  success rate {:.1}%  completion {:.1}%  avg retries {:.2}",
                s.success_percent, s.completion_percent, s.average_retries
            );
            out.push_str("\nBy status\n");
            for share in &panel.breakdown {
                let _ = writeln!(
                    out,
                    "  {:<12} {:>8} {:>6.1}%",
                    share.status.as_str(),
                    share.count,
                    share.percent
                );
            }
        }
        None => unavailable(&mut out, &dashboard.statistics),
    }

    let _ = writeln!(out, "\nTimeline (per {})", dashboard.interval);
    match &dashboard.timeline.data {
        Some(rows) if rows.is_empty() => out.push_str("  no activity\n"),
        Some(rows) => {
            for row in rows {
                let _ = writeln!(
                    out,
                    "  {:<20} total {:>6}  completed {:>6}  failed {:>6}  {:>5.1}%",
                    row.period, row.total, row.completed, row.failed, row.success_percent
                );
            }
        }
        None => unavailable(&mut out, &dashboard.timeline),
    }

    out.push_str("\nRecent\n");
    match &dashboard.recent.data {
        Some(rows) if rows.is_empty() => out.push_str("  no transmissions\n"),
        Some(rows) => {
            for row in rows {
                let _ = writeln!(
                    out,
                    "  {:<38} {:<12} retries {:>2}  {}",
                    row.id,
                    row.status.as_str(),
                    row.retry_count,
                    row.age
                );
            }
        }
        None => unavailable(&mut out, &dashboard.recent),
    }

    out
}

pub fn render_detail(view: &TransmissionDetailView) -> String {
    let mut out = String::new();
    match &view.transmission.data {
        Some(t) => {
            let _ = writeln!(out, "Transmission {}", t.id);
            let _ = writeln!(out, "  organization {}", t.organization_id);
            let _ = writeln!(out, "  status       {}", t.status);
            let _ = writeln!(out, "  retries      {}", t.retry_count);
            if let Some(submission) = &t.submission_id {
                let _ = writeln!(out, "  submission   {submission}");
            }
        }
        None => {
            out.push_str("Transmission\n");
            unavailable(&mut out, &view.transmission);
        }
    }

    out.push_str("\nHistory\n");
    match &view.history.data {
        Some(rows) if rows.is_empty() => out.push_str("  no events\n"),
        Some(rows) => {
            for row in rows {
                let gap = row
                    .since_previous
                    .as_deref()
                    .map(|g| format!(" (+{g})"))
                    .unwrap_or_default();
                let _ = write!(out, "  {} {}{gap}", row.timestamp, row.status);
                if let Some(message) = &row.message {
                    let _ = write!(out, ": {message}");
                }
                out.push('\n');
            }
        }
        None => unavailable(&mut out, &view.history),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::transmissions::TransmissionDashboard;
    use chrono::{TimeZone, Utc};
    use einvoice_sdk::{
        Error, Fetched, TimelineInterval, TransmissionStatistics, TransmissionTimeline,
    };

    #[test]
    fn test_render_dashboard_with_failed_panels() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let dashboard = TransmissionDashboard::assemble(
            TimelineInterval::Hour,
            Ok(Fetched {
                data: TransmissionStatistics {
                    total: 4,
                    completed: 3,
                    failed: 1,
                    success_rate: 0.75,
                    ..Default::default()
                },
                status: 200,
            }),
            Ok(Fetched {
                data: TransmissionTimeline::default(),
                status: 200,
            }),
            Err(Error::Api {
                status: 503,
                message: "list service down".into(),
            }),
            now,
        );

        let text = render_dashboard(&dashboard);
        assert!(text.contains("total 4  completed 3  failed 1"));
        assert!(text.contains("success rate 75.0%"));
        assert!(text.contains("Timeline (per hour)"));
        assert!(text.contains("no activity"));
        assert!(text.contains("unavailable (503): list service down"));
    }
}
