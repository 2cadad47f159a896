//! Date-range presets
//!
//! A [`Timeline`] narrows a session table to a window anchored on the launch dates
//! found in the log itself, never on the current wall-clock date. The window
//! markers are computed over every row, finished or not.

use crate::models::SessionTable;
use anyhow::Result;
use chrono::{Datelike, Duration, Months, NaiveDate};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
pub enum Timeline {
    #[default]
    #[value(name = "all")]
    #[serde(rename = "All")]
    All,
    #[value(name = "first-30-days")]
    #[serde(rename = "First 30 days")]
    First30Days,
    #[value(name = "recent-30-days")]
    #[serde(rename = "Recent 30 days")]
    Recent30Days,
    #[value(name = "recent-60-days")]
    #[serde(rename = "Recent 60 days")]
    Recent60Days,
    #[value(name = "recent-month")]
    #[serde(rename = "Recent month")]
    RecentMonth,
    #[value(name = "prev-month")]
    #[serde(rename = "Prev month")]
    PrevMonth,
    #[value(name = "recent-year")]
    #[serde(rename = "Recent year")]
    RecentYear,
    #[value(name = "prev-year")]
    #[serde(rename = "Prev year")]
    PrevYear,
}

/// Anchor dates derived from the launch dates of a log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineMarkers {
    pub latest_day: NaiveDate,
    pub first_30_days: NaiveDate,
    pub recent_30_days: NaiveDate,
    pub recent_60_days: NaiveDate,
    pub latest_month_start: NaiveDate,
    pub prev_month_start: NaiveDate,
    pub latest_year_start: NaiveDate,
    pub prev_year_start: NaiveDate,
}

impl TimelineMarkers {
    /// `None` when no row has a launch date
    pub fn from_table(table: &SessionTable) -> Option<Self> {
        let mut dates = table.sessions().filter_map(|s| s.launch_date);
        let first = dates.next()?;
        let (earliest, latest) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Self::new(earliest, latest)
    }

    fn new(earliest: NaiveDate, latest: NaiveDate) -> Option<Self> {
        let latest_month_start = latest.with_day(1)?;
        let latest_year_start = NaiveDate::from_ymd_opt(latest.year(), 1, 1)?;

        Some(Self {
            latest_day: latest,
            first_30_days: earliest.checked_add_signed(Duration::days(30))?,
            recent_30_days: latest.checked_sub_signed(Duration::days(30))?,
            recent_60_days: latest.checked_sub_signed(Duration::days(60))?,
            latest_month_start,
            prev_month_start: latest_month_start.checked_sub_months(Months::new(1))?,
            latest_year_start,
            prev_year_start: NaiveDate::from_ymd_opt(latest.year() - 1, 1, 1)?,
        })
    }
}

impl Timeline {
    pub const ALL: [Timeline; 8] = [
        Timeline::All,
        Timeline::First30Days,
        Timeline::Recent30Days,
        Timeline::Recent60Days,
        Timeline::RecentMonth,
        Timeline::PrevMonth,
        Timeline::RecentYear,
        Timeline::PrevYear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Timeline::All => "All",
            Timeline::First30Days => "First 30 days",
            Timeline::Recent30Days => "Recent 30 days",
            Timeline::Recent60Days => "Recent 60 days",
            Timeline::RecentMonth => "Recent month",
            Timeline::PrevMonth => "Prev month",
            Timeline::RecentYear => "Recent year",
            Timeline::PrevYear => "Prev year",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Timeline::All => "all",
            Timeline::First30Days => "first-30-days",
            Timeline::Recent30Days => "recent-30-days",
            Timeline::Recent60Days => "recent-60-days",
            Timeline::RecentMonth => "recent-month",
            Timeline::PrevMonth => "prev-month",
            Timeline::RecentYear => "recent-year",
            Timeline::PrevYear => "prev-year",
        }
    }

    /// Whether a launch date falls inside this window
    pub fn contains(&self, markers: &TimelineMarkers, date: NaiveDate) -> bool {
        match self {
            Timeline::All => true,
            Timeline::First30Days => date <= markers.first_30_days,
            Timeline::Recent30Days => date >= markers.recent_30_days,
            Timeline::Recent60Days => date >= markers.recent_60_days,
            Timeline::RecentMonth => date >= markers.latest_month_start,
            Timeline::PrevMonth => {
                date >= markers.prev_month_start && date < markers.latest_month_start
            }
            Timeline::RecentYear => date >= markers.latest_year_start,
            Timeline::PrevYear => {
                date >= markers.prev_year_start && date < markers.latest_year_start
            }
        }
    }

    /// Rows of `table` inside this window
    pub fn apply(&self, table: &SessionTable) -> SessionTable {
        if *self == Timeline::All {
            return table.clone();
        }

        let Some(markers) = TimelineMarkers::from_table(table) else {
            debug!(range = self.label(), "No launch dates in log, range filter skipped");
            return table.clone();
        };

        let filtered =
            table.retain_rows(|s| s.launch_date.is_some_and(|d| self.contains(&markers, d)));
        debug!(
            range = self.label(),
            kept = filtered.len(),
            total = table.len(),
            "Applied date range"
        );
        filtered
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeline {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Timeline::ALL
            .into_iter()
            .find(|t| {
                t.label().eq_ignore_ascii_case(wanted) || t.slug().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| anyhow::anyhow!("Unknown date range: {}", s))
    }
}
