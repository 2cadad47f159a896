//! Summary KPIs for a (filtered) session log and its peak usage table

use crate::models::{columns, PeakUsageDay, SessionTable, SummaryReport};
use crate::timestamp_parser::TimestampParser;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt::Write;
use tracing::warn;

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn format_timestamp(dt: DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", dt.format(format)).is_err() {
        warn!(format, "Invalid timestamp format, falling back to RFC 3339");
        return dt.to_rfc3339();
    }
    out
}

fn max_and_avg(
    peak: &[PeakUsageDay],
    column: impl Fn(&PeakUsageDay) -> u64,
) -> (Option<u64>, Option<f64>) {
    let max = peak.iter().map(&column).max();
    let avg = (!peak.is_empty())
        .then(|| round_to(peak.iter().map(&column).sum::<u64>() as f64 / peak.len() as f64, 2));
    (max, avg)
}

/// Build the summary from the table the peak usage was computed on
pub fn summarize(
    table: &SessionTable,
    peak: &[PeakUsageDay],
    finished_state: &str,
    timestamp_format: &str,
) -> SummaryReport {
    let finished = || table.sessions().filter(|s| s.is_in_state(finished_state));

    let log_starts = finished()
        .filter_map(|s| s.launch_unix)
        .min()
        .and_then(TimestampParser::from_unix)
        .map(|dt| format_timestamp(dt, timestamp_format));
    let log_ends = finished()
        .filter_map(|s| s.end_unix)
        .max()
        .and_then(TimestampParser::from_unix)
        .map(|dt| format_timestamp(dt, timestamp_format));

    let total_hours = round_to(table.sessions().map(|s| s.hours()).sum(), 2);

    let (unique_users, unique_versions) = if table.has_column(columns::USERNAME) {
        let users: HashSet<&str> = finished().filter_map(|s| s.username.as_deref()).collect();
        let versions: HashSet<&str> = finished().filter_map(|s| s.version.as_deref()).collect();
        (Some(users.len()), Some(versions.len()))
    } else {
        (None, None)
    };

    let (max_daily_users, avg_daily_users) = max_and_avg(peak, |d| d.unique_users);
    let (max_daily_cpus, avg_daily_cpus) = max_and_avg(peak, |d| d.peak_cpus);
    let (max_daily_gpus, avg_daily_gpus) = max_and_avg(peak, |d| d.peak_gpus);

    let total_days_used = peak.iter().filter(|d| d.peak_sessions > 0).count();

    SummaryReport {
        log_starts,
        log_ends,
        total_hours,
        total_sessions: table.len(),
        unique_users,
        unique_versions,
        max_daily_users,
        avg_daily_users,
        max_daily_cpus,
        avg_daily_cpus,
        max_daily_gpus,
        avg_daily_gpus,
        total_days_used,
        total_days_not_used: peak.len() - total_days_used,
    }
}
