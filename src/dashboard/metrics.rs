//! Display arithmetic shared by the dashboard views.

use chrono::{DateTime, Utc};

/// `part / total` as a percentage rounded to one decimal.
///
/// Returns `0.0` when `total` is zero.
pub fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(part as f64 / total as f64 * 100.0)
}

/// Sweep angle of the success-rate ring, in degrees.
///
/// `success_rate` is a `0.0..=1.0` fraction. Out-of-range input is clamped
/// and non-finite input (e.g. a `0/0` rate) yields `0.0`.
pub fn radial_degrees(success_rate: f64) -> f64 {
    if !success_rate.is_finite() {
        return 0.0;
    }
    (success_rate * 360.0).clamp(0.0, 360.0)
}

/// Fraction in `0.0..=1.0`, `0.0` for an empty total.
pub fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64).min(1.0)
    }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Coarse "time ago" label relative to `now`.
pub fn format_relative(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - ts).num_seconds();
    if secs < 60 {
        // Also covers timestamps slightly in the future (clock skew).
        return "just now".to_string();
    }
    let minutes = secs / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

/// Human-readable span between two instants, e.g. `2h 5m`.
pub fn format_elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    let secs = (to - from).num_seconds().max(0);
    match secs {
        0..60 => format!("{secs}s"),
        60..3600 => format!("{}m {}s", secs / 60, secs % 60),
        _ => format!("{}h {}m", secs / 3600, (secs % 3600) / 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_percentage_guards_zero_total() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert!(percentage(0, 0).is_finite());
    }

    #[test]
    fn test_percentage_rounds() {
        assert_eq!(percentage(1, 3), 33.3);
        assert_eq!(percentage(2, 3), 66.7);
        assert_eq!(percentage(7, 7), 100.0);
    }

    #[test]
    fn test_radial_degrees() {
        assert_eq!(radial_degrees(0.5), 180.0);
        assert_eq!(radial_degrees(1.2), 360.0);
        assert_eq!(radial_degrees(-0.1), 0.0);
        assert_eq!(radial_degrees(f64::NAN), 0.0);
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(3, 4), 0.75);
        assert_eq!(ratio(3, 0), 0.0);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(at(9, 5, 0)), "2024-05-01 09:05 UTC");
    }

    #[test]
    fn test_format_relative() {
        let now = at(12, 0, 0);
        assert_eq!(format_relative(now - Duration::seconds(10), now), "just now");
        assert_eq!(format_relative(now + Duration::seconds(30), now), "just now");
        assert_eq!(format_relative(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_relative(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_relative(now - Duration::days(2), now), "2d ago");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(at(10, 0, 0), at(10, 0, 42)), "42s");
        assert_eq!(format_elapsed(at(10, 0, 0), at(10, 5, 3)), "5m 3s");
        assert_eq!(format_elapsed(at(10, 0, 0), at(12, 5, 0)), "2h 5m");
        assert_eq!(format_elapsed(at(10, 0, 0), at(9, 0, 0)), "0s");
    }
}
