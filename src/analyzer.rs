//! Session Analysis Engine
//!
//! This module provides the analysis engine that orchestrates the whole pipeline for
//! one sessions CSV. It is the primary entry point for all report commands.
//!
//! ### Data Processing Pipeline
//! 1. **Loading**: Reads the CSV on a blocking worker thread
//! 2. **Filtering**: Applies the selected date-range preset
//! 3. **Expansion**: Expands finished sessions into daily presence rows
//! 4. **Aggregation**: Summary KPIs, version usage and top users
//! 5. **Reporting**: Terminal or JSON output, optional CSV export
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use steam_stats::{StatsAnalyzer, ProcessOptions, ReportKind, Timeline};
//! use steam_stats::config::Config;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let analyzer = StatsAnalyzer::new(Config::default());
//!
//! let options = ProcessOptions {
//!     command: ReportKind::Peak,
//!     input: "sessions.csv".into(),
//!     timeline: Timeline::Recent30Days,
//!     json_output: false,
//!     limit: None,
//!     export: None,
//! };
//!
//! analyzer.run_command(options).await?;
//! # Ok(())
//! # }
//! ```

use crate::breakdown::{top_users, version_usage};
use crate::config::Config;
use crate::display::ReportDisplayManager;
use crate::export::{self, write_csv};
use crate::loader::load_sessions;
use crate::models::*;
use crate::peak::compute_peak_usage;
use crate::summary::summarize;
use crate::timeline::Timeline;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Which report a command produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Report,
    Summary,
    Peak,
    Versions,
    Users,
    Table,
}

impl ReportKind {
    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Report => "report",
            ReportKind::Summary => "summary",
            ReportKind::Peak => "peak",
            ReportKind::Versions => "versions",
            ReportKind::Users => "users",
            ReportKind::Table => "table",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub command: ReportKind,
    pub input: PathBuf,
    pub timeline: Timeline,
    pub json_output: bool,
    /// Row cap for `users` and `table`; configured defaults apply when `None`
    pub limit: Option<usize>,
    /// `Some(None)` exports to the data directory under the default file name
    pub export: Option<Option<PathBuf>>,
}

pub struct StatsAnalyzer {
    config: Config,
    display_manager: ReportDisplayManager,
}

impl StatsAnalyzer {
    pub fn new(config: Config) -> Self {
        let display_manager = ReportDisplayManager::new(config.output.json_pretty);
        Self {
            config,
            display_manager,
        }
    }

    pub async fn load(&self, path: &Path) -> Result<SessionTable> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || load_sessions(&path))
            .await
            .context("Session loading task failed")?
    }

    pub fn peak_usage(&self, table: &SessionTable) -> Vec<PeakUsageDay> {
        compute_peak_usage(
            table,
            &self.config.analysis.finished_state,
            self.config.analysis.max_peak_days,
        )
    }

    pub fn summary(&self, table: &SessionTable, peak: &[PeakUsageDay]) -> SummaryReport {
        summarize(
            table,
            peak,
            &self.config.analysis.finished_state,
            &self.config.output.timestamp_format,
        )
    }

    /// Filter `table` to `timeline` and compute every dashboard table over the result
    pub fn build_report(&self, table: &SessionTable, timeline: Timeline) -> DashboardReport {
        self.report_from_filtered(&timeline.apply(table), timeline)
    }

    fn report_from_filtered(&self, filtered: &SessionTable, timeline: Timeline) -> DashboardReport {
        let peak_usage = self.peak_usage(filtered);
        let summary = self.summary(filtered, &peak_usage);

        DashboardReport {
            source: filtered.source.clone(),
            range: timeline,
            summary,
            peak_usage,
            version_usage: version_usage(filtered),
            top_users: top_users(filtered, self.config.analysis.top_users_limit),
        }
    }

    fn export_path(&self, options: &ProcessOptions, file_name: &str) -> Option<PathBuf> {
        options.export.as_ref().map(|explicit| {
            export::resolve_export_path(
                explicit.as_deref(),
                &self.config.paths.data_directory,
                file_name,
            )
        })
    }

    pub async fn run_command(&self, options: ProcessOptions) -> Result<()> {
        let table = self.load(&options.input).await?;

        if table.is_empty() {
            warn!(source = %table.source, "Session log has no rows");
        }

        let filtered = options.timeline.apply(&table);
        info!(
            command = options.command.name(),
            range = options.timeline.label(),
            rows = filtered.len(),
            "Running report"
        );

        let source = filtered.source.as_str();
        let range = options.timeline;
        let json = options.json_output;

        match options.command {
            ReportKind::Report => {
                let report = self.report_from_filtered(&filtered, range);
                if let Some(path) = self.export_path(&options, export::PEAK_USAGE_FILE) {
                    write_csv(&path, &report.peak_usage)?;
                }
                self.display_manager.display_report(&report, json)?;
            }
            ReportKind::Summary => {
                let peak = self.peak_usage(&filtered);
                let summary = self.summary(&filtered, &peak);
                if let Some(path) = self.export_path(&options, export::SUMMARY_FILE) {
                    write_csv(&path, &summary.kpis())?;
                }
                self.display_manager.display_summary(&summary, source, range, json)?;
            }
            ReportKind::Peak => {
                let peak = self.peak_usage(&filtered);
                if let Some(path) = self.export_path(&options, export::PEAK_USAGE_FILE) {
                    write_csv(&path, &peak)?;
                }
                self.display_manager.display_peak(&peak, source, range, json)?;
            }
            ReportKind::Versions => {
                let versions = version_usage(&filtered);
                if let Some(path) = self.export_path(&options, export::VERSION_USAGE_FILE) {
                    write_csv(&path, &versions)?;
                }
                self.display_manager.display_versions(&versions, source, range, json)?;
            }
            ReportKind::Users => {
                let limit = options.limit.unwrap_or(self.config.analysis.top_users_limit);
                let users = top_users(&filtered, limit);
                if let Some(path) = self.export_path(&options, export::USER_USAGE_FILE) {
                    write_csv(&path, &users)?;
                }
                self.display_manager.display_users(&users, source, range, json)?;
            }
            ReportKind::Table => {
                if options.export.is_some() {
                    anyhow::bail!("The table command does not support --export");
                }
                let limit = options.limit.unwrap_or(self.config.analysis.raw_rows_limit);
                self.display_manager.display_table(&filtered, range, limit, json)?;
            }
        }

        Ok(())
    }
}
