//! Core Data Models
//!
//! This module defines the data structures used throughout the session analysis
//! pipeline, from raw CSV rows to the derived dashboard tables.
//!
//! ## Data Flow
//!
//! 1. **Raw Data**: [`SessionTable`] - Header plus [`SessionRow`]s read from a sessions CSV
//! 2. **Typed View**: [`SessionRecord`] - The columns the analysis understands, all optional
//! 3. **Derived Tables**: [`PeakUsageDay`], [`VersionUsage`], [`UserUsage`]
//! 4. **Reports**: [`SummaryReport`] and [`DashboardReport`]
//!
//! ## Features
//!
//! - **Serde Integration**: Derived tables serialize with stable field names for JSON and CSV
//!   export
//! - **Optional Fields**: Missing columns and unparsable cells are carried as `None`
//! - **Column Lookup**: [`SessionTable::has_column`] drives the ad hoc "N/A" handling

use crate::timeline::Timeline;
use chrono::NaiveDate;
use serde::Serialize;

/// Column names the analysis reads from a sessions CSV
pub mod columns {
    pub const LAUNCH_UNIX: &str = "session_launch_unix";
    pub const END_UNIX: &str = "session_end_unix";
    pub const LAUNCH_DATE: &str = "session_launch_date";
    pub const DURATION_SEC: &str = "session_duration_sec";
    pub const STATE: &str = "session_state";
    pub const USERNAME: &str = "username";
    pub const VERSION: &str = "version";
    pub const CPU_COUNT: &str = "cpu_count";
    pub const GPU_COUNT: &str = "gpu_count";
}

/// Label used wherever a value cannot be derived from the data
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    pub launch_unix: Option<i64>,
    pub end_unix: Option<i64>,
    pub launch_date: Option<NaiveDate>,
    pub duration_sec: Option<f64>,
    pub state: Option<String>,
    pub username: Option<String>,
    pub version: Option<String>,
    pub cpu_count: Option<u32>,
    pub gpu_count: Option<u32>,
}

impl SessionRecord {
    pub fn is_in_state(&self, state: &str) -> bool {
        self.state.as_deref() == Some(state)
    }

    pub fn hours(&self) -> f64 {
        self.duration_sec.unwrap_or(0.0) / 3600.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRow {
    /// Cells exactly as they appeared in the file
    pub raw: Vec<String>,
    pub session: SessionRecord,
}

#[derive(Debug, Clone, Default)]
pub struct SessionTable {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<SessionRow>,
}

impl SessionTable {
    pub fn new(source: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            source: source.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn sessions(&self) -> impl Iterator<Item = &SessionRecord> {
        self.rows.iter().map(|r| &r.session)
    }

    /// Same headers and source, keeping only the rows matching `keep`
    pub fn retain_rows<F>(&self, mut keep: F) -> SessionTable
    where
        F: FnMut(&SessionRecord) -> bool,
    {
        SessionTable {
            source: self.source.clone(),
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(&row.session))
                .cloned()
                .collect(),
        }
    }
}

/// One calendar day of the expanded session range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeakUsageDay {
    pub day_present: NaiveDate,
    pub peak_sessions: u64,
    pub peak_cpus: u64,
    pub peak_gpus: u64,
    pub unique_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionUsage {
    pub product: String,
    pub sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserUsage {
    pub username: String,
    pub sessions: u64,
    pub hours: f64,
}

/// A single label/value row of the summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpi {
    #[serde(rename = "KPI")]
    pub label: String,
    #[serde(rename = "Values")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    #[serde(rename = "logStarts")]
    pub log_starts: Option<String>,
    #[serde(rename = "logEnds")]
    pub log_ends: Option<String>,
    #[serde(rename = "totalHours")]
    pub total_hours: f64,
    #[serde(rename = "totalSessions")]
    pub total_sessions: usize,
    /// `None` when the log has no username column
    #[serde(rename = "uniqueUsers")]
    pub unique_users: Option<usize>,
    #[serde(rename = "uniqueVersions")]
    pub unique_versions: Option<usize>,
    #[serde(rename = "maxDailyUsers")]
    pub max_daily_users: Option<u64>,
    #[serde(rename = "avgDailyUsers")]
    pub avg_daily_users: Option<f64>,
    #[serde(rename = "maxDailyCpus")]
    pub max_daily_cpus: Option<u64>,
    #[serde(rename = "avgDailyCpus")]
    pub avg_daily_cpus: Option<f64>,
    #[serde(rename = "maxDailyGpus")]
    pub max_daily_gpus: Option<u64>,
    #[serde(rename = "avgDailyGpus")]
    pub avg_daily_gpus: Option<f64>,
    #[serde(rename = "totalDaysUsed")]
    pub total_days_used: usize,
    #[serde(rename = "totalDaysNotUsed")]
    pub total_days_not_used: usize,
}

impl SummaryReport {
    /// The summary as the 14-row KPI table
    pub fn kpis(&self) -> Vec<Kpi> {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        }

        // Whole numbers keep one decimal so "1.0" is not shown as "1"
        fn float(value: f64) -> String {
            if value.is_finite() && value.fract() == 0.0 {
                format!("{:.1}", value)
            } else {
                value.to_string()
            }
        }
        fn opt_float(value: Option<f64>) -> String {
            value.map(float).unwrap_or_else(|| NOT_AVAILABLE.to_string())
        }

        let rows = [
            ("Log Starts", opt(&self.log_starts)),
            ("Log Ends", opt(&self.log_ends)),
            ("Total Hours of Use", float(self.total_hours)),
            ("Total Sessions", self.total_sessions.to_string()),
            ("# of Unique Users", opt(&self.unique_users)),
            ("# of Unique Product Versions", opt(&self.unique_versions)),
            ("Max Daily Users", opt(&self.max_daily_users)),
            ("Avg Daily Users", opt_float(self.avg_daily_users)),
            ("Max Daily CPUs", opt(&self.max_daily_cpus)),
            ("Avg Daily CPUs", opt_float(self.avg_daily_cpus)),
            ("Max Daily GPUs", opt(&self.max_daily_gpus)),
            ("Avg Daily GPUs", opt_float(self.avg_daily_gpus)),
            ("Total Days Used", self.total_days_used.to_string()),
            ("Total Days Not Used", self.total_days_not_used.to_string()),
        ];

        rows.into_iter()
            .map(|(label, value)| Kpi {
                label: label.to_string(),
                value,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    pub source: String,
    pub range: Timeline,
    pub summary: SummaryReport,
    #[serde(rename = "peakUsage")]
    pub peak_usage: Vec<PeakUsageDay>,
    #[serde(rename = "versionUsage")]
    pub version_usage: Vec<VersionUsage>,
    #[serde(rename = "topUsers")]
    pub top_users: Vec<UserUsage>,
}
