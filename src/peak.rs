//! Daily peak usage
//!
//! Expands every finished session into one presence per calendar day between its
//! launch and end dates (UTC), then aggregates per day: active sessions, summed CPU
//! and GPU counts, and distinct users. Every day of the observed range is reported,
//! including days nobody used.

use crate::models::{PeakUsageDay, SessionRecord, SessionTable};
use crate::timestamp_parser::TimestampParser;
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct DayAccumulator<'a> {
    sessions: u64,
    cpus: u64,
    gpus: u64,
    users: HashSet<&'a str>,
}

fn session_dates(session: &SessionRecord) -> Option<(NaiveDate, NaiveDate)> {
    Some((
        session.launch_unix.and_then(TimestampParser::unix_date)?,
        session.end_unix.and_then(TimestampParser::unix_date)?,
    ))
}

fn day_limit(max_days: usize) -> i64 {
    i64::try_from(max_days).unwrap_or(i64::MAX)
}

/// Launch and end dates further apart than `max_days` calendar days
fn is_overlong(session: &SessionRecord, max_days: usize) -> bool {
    session_dates(session)
        .is_some_and(|(start, end)| (end - start).num_days() + 1 > day_limit(max_days))
}

/// First and last day of the expansion range for sessions in `finished_state`.
///
/// The range runs from the earliest launch date to the latest end date; each bound
/// only needs its own timestamp to be present. Sessions spanning more than
/// `max_days` days take no part.
pub fn day_range(
    table: &SessionTable,
    finished_state: &str,
    max_days: usize,
) -> Option<(NaiveDate, NaiveDate)> {
    let eligible = || {
        table
            .sessions()
            .filter(|s| s.is_in_state(finished_state) && !is_overlong(s, max_days))
    };

    let first = eligible()
        .filter_map(|s| s.launch_unix.and_then(TimestampParser::unix_date))
        .min()?;
    let last = eligible()
        .filter_map(|s| s.end_unix.and_then(TimestampParser::unix_date))
        .max()?;
    (first <= last).then_some((first, last))
}

/// Per-day peak usage over the finished sessions of `table`, ordered by day.
///
/// At most `max_days` days are reported. Sessions longer than that are skipped, and
/// a wider range keeps only its most recent `max_days` days.
pub fn compute_peak_usage(
    table: &SessionTable,
    finished_state: &str,
    max_days: usize,
) -> Vec<PeakUsageDay> {
    let skipped = table
        .sessions()
        .filter(|s| s.is_in_state(finished_state) && is_overlong(s, max_days))
        .count();
    if skipped > 0 {
        warn!(
            source = %table.source,
            skipped,
            max_days,
            "Skipping sessions that span more days than the peak usage limit"
        );
    }

    let Some((mut first, last)) = day_range(table, finished_state, max_days) else {
        debug!(source = %table.source, "No finished sessions with timestamps, peak usage is empty");
        return Vec::new();
    };

    let limit = day_limit(max_days);
    if (last - first).num_days() + 1 > limit {
        let clamped = last.checked_sub_signed(Duration::days(limit - 1)).unwrap_or(first);
        warn!(
            source = %table.source,
            from = %first,
            kept_from = %clamped,
            max_days,
            "Peak usage range exceeds the day limit, keeping the most recent days"
        );
        first = clamped;
    }

    let days = (last - first).num_days() as usize + 1;
    let mut accumulators: Vec<DayAccumulator> =
        (0..days).map(|_| DayAccumulator::default()).collect();

    let mut expanded = 0usize;
    for session in table.sessions().filter(|s| s.is_in_state(finished_state)) {
        let Some((start, end)) = session_dates(session) else {
            continue;
        };
        if is_overlong(session, max_days) {
            continue;
        }

        // Clamp to the range; a session ending before it starts yields no days
        let start = start.max(first);
        let end = end.min(last);
        if start > end {
            continue;
        }

        let offset = (start - first).num_days() as usize;
        let span = (end - start).num_days() as usize + 1;
        for acc in &mut accumulators[offset..offset + span] {
            acc.sessions += 1;
            acc.cpus += u64::from(session.cpu_count.unwrap_or(0));
            acc.gpus += u64::from(session.gpu_count.unwrap_or(0));
            if let Some(user) = session.username.as_deref() {
                acc.users.insert(user);
            }
        }
        expanded += span;
    }

    debug!(
        source = %table.source,
        days,
        expanded_rows = expanded,
        "Expanded sessions into daily presence"
    );

    accumulators
        .into_iter()
        .enumerate()
        .map(|(i, acc)| PeakUsageDay {
            day_present: first + Duration::days(i as i64),
            peak_sessions: acc.sessions,
            peak_cpus: acc.cpus,
            peak_gpus: acc.gpus,
            unique_users: acc.users.len() as u64,
        })
        .collect()
}
