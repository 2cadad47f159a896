//! Output Formatting and Display Management
//!
//! This module handles all output formatting for session analysis results.
//! It provides both human-readable terminal output with colors and structured JSON
//! output for programmatic consumption.
//!
//! ## Report Types
//! - **Summary**: The KPI table (log span, hours, sessions, users, daily peaks)
//! - **Peak Usage**: One line per day with sessions, CPUs, GPUs and unique users
//! - **Version Usage**: Sessions per product version
//! - **Top Users**: Users with the most sessions and their hours
//! - **Raw Table**: The filtered log itself, capped to a row limit
//!
//! ### JSON Output
//! When `json_output` is enabled, reports are written as a single JSON document:
//! ```json
//! {
//!   "source": "sessions.csv",
//!   "range": "Recent 30 days",
//!   "peakUsage": [
//!     {
//!       "day_present": "2021-10-01",
//!       "peak_sessions": 3,
//!       "peak_cpus": 12,
//!       "peak_gpus": 1,
//!       "unique_users": 2
//!     }
//!   ]
//! }
//! ```

use crate::models::*;
use crate::timeline::Timeline;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

const MAX_CELL_WIDTH: usize = 24;

pub struct ReportDisplayManager {
    json_pretty: bool,
}

impl ReportDisplayManager {
    pub fn new(json_pretty: bool) -> Self {
        Self { json_pretty }
    }

    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.json_pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.context("Failed to serialize report to JSON")
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", self.to_json(value)?);
        Ok(())
    }

    fn print_banner(&self, title: &str, source: &str, range: Timeline) {
        println!("\n{}", "=".repeat(80).bright_cyan());
        println!("{}", title.bright_white().bold());
        println!("{}", "=".repeat(80).bright_cyan());
        println!(
            "{} {} • Date Range: {}\n",
            "📄".bright_yellow(),
            source.bright_white().bold(),
            range.label().bright_yellow()
        );
    }

    pub fn display_report(&self, report: &DashboardReport, json_output: bool) -> Result<()> {
        if json_output {
            return self.print_json(report);
        }

        self.print_banner("Session Usage Report", &report.source, report.range);
        self.print_summary(&report.summary);
        println!();
        self.print_peak(&report.peak_usage);
        println!();
        self.print_versions(&report.version_usage);
        println!();
        self.print_users(&report.top_users);
        Ok(())
    }

    pub fn display_summary(
        &self,
        summary: &SummaryReport,
        source: &str,
        range: Timeline,
        json_output: bool,
    ) -> Result<()> {
        if json_output {
            let output = serde_json::json!({"source": source, "range": range, "summary": summary});
            return self.print_json(&output);
        }

        self.print_banner("Session Usage Summary", source, range);
        self.print_summary(summary);
        Ok(())
    }

    pub fn display_peak(
        &self,
        peak: &[PeakUsageDay],
        source: &str,
        range: Timeline,
        json_output: bool,
    ) -> Result<()> {
        if json_output {
            let output = serde_json::json!({"source": source, "range": range, "peakUsage": peak});
            return self.print_json(&output);
        }

        self.print_banner("Peak Usage by Day", source, range);
        self.print_peak(peak);
        Ok(())
    }

    pub fn display_versions(
        &self,
        versions: &[VersionUsage],
        source: &str,
        range: Timeline,
        json_output: bool,
    ) -> Result<()> {
        if json_output {
            let output =
                serde_json::json!({"source": source, "range": range, "versionUsage": versions});
            return self.print_json(&output);
        }

        self.print_banner("Version Usage by Sessions", source, range);
        self.print_versions(versions);
        Ok(())
    }

    pub fn display_users(
        &self,
        users: &[UserUsage],
        source: &str,
        range: Timeline,
        json_output: bool,
    ) -> Result<()> {
        if json_output {
            let output = serde_json::json!({"source": source, "range": range, "topUsers": users});
            return self.print_json(&output);
        }

        self.print_banner("Power Users by Sessions/Hours", source, range);
        self.print_users(users);
        Ok(())
    }

    pub fn display_table(
        &self,
        table: &SessionTable,
        range: Timeline,
        limit: usize,
        json_output: bool,
    ) -> Result<()> {
        let shown = table.len().min(limit);

        if json_output {
            let rows: Vec<serde_json::Map<String, serde_json::Value>> = table.rows[..shown]
                .iter()
                .map(|row| {
                    table
                        .headers
                        .iter()
                        .zip(row.raw.iter())
                        .map(|(h, v)| (h.clone(), serde_json::Value::String(v.clone())))
                        .collect()
                })
                .collect();
            let output = serde_json::json!({
                "source": table.source,
                "range": range,
                "columns": table.headers,
                "totalRows": table.len(),
                "rows": rows,
            });
            return self.print_json(&output);
        }

        self.print_banner("Raw Dataset", &table.source, range);
        println!(
            "{} Showing {} of {} rows\n",
            "📊".bright_yellow(),
            shown.to_string().bright_white().bold(),
            table.len().to_string().bright_white().bold()
        );

        let widths: Vec<usize> = table
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                table.rows[..shown]
                    .iter()
                    .filter_map(|r| r.raw.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
                    .min(MAX_CELL_WIDTH)
            })
            .collect();

        let header_line: Vec<String> = table
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| format!("{:<w$}", truncate(h, *w), w = *w))
            .collect();
        println!("{}", header_line.join(" │ ").bright_cyan().bold());

        for row in &table.rows[..shown] {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let cell = row.raw.get(i).map(String::as_str).unwrap_or("");
                    format!("{:<w$}", truncate(cell, *w), w = *w)
                })
                .collect();
            println!("{}", cells.join(" │ "));
        }
        Ok(())
    }

    pub fn display_ranges(&self, json_output: bool) -> Result<()> {
        if json_output {
            let ranges: Vec<_> = Timeline::ALL
                .iter()
                .map(|t| serde_json::json!({"name": t.slug(), "label": t.label()}))
                .collect();
            return self.print_json(&ranges);
        }

        println!("{}", "Available date ranges:".bright_white().bold());
        for timeline in Timeline::ALL {
            println!("   {:<16} {}", timeline.slug().bright_cyan(), timeline.label());
        }
        Ok(())
    }

    fn print_summary(&self, summary: &SummaryReport) {
        println!("{}", "Summary".bright_white().bold().underline());
        for kpi in summary.kpis() {
            let value = if kpi.value == NOT_AVAILABLE {
                kpi.value.dimmed()
            } else {
                kpi.value.bright_green()
            };
            println!("   {:<30} {}", kpi.label.bright_cyan(), value);
        }
    }

    fn print_peak(&self, peak: &[PeakUsageDay]) {
        println!("{}", "Peak Usage by Day".bright_white().bold().underline());
        if peak.is_empty() {
            println!("   {}", "No finished sessions in range".dimmed());
            return;
        }

        println!(
            "   {:<12} {:>14} {:>10} {:>10} {:>13}",
            "Day Present".bright_cyan(),
            "Peak Sessions".bright_cyan(),
            "Peak CPUs".bright_cyan(),
            "Peak GPUs".bright_cyan(),
            "Unique Users".bright_cyan()
        );
        for day in peak {
            let line = format!(
                "   {:<12} {:>14} {:>10} {:>10} {:>13}",
                day.day_present.format("%Y-%m-%d").to_string(),
                day.peak_sessions,
                day.peak_cpus,
                day.peak_gpus,
                day.unique_users
            );
            if day.peak_sessions == 0 {
                println!("{}", line.dimmed());
            } else {
                println!("{}", line);
            }
        }
    }

    fn print_versions(&self, versions: &[VersionUsage]) {
        println!("{}", "Version Usage by Sessions".bright_white().bold().underline());
        if versions.is_empty() {
            println!("   {}", "No version information".dimmed());
            return;
        }

        let total: u64 = versions.iter().map(|v| v.sessions).sum();
        for version in versions {
            let percentage = if total > 0 {
                version.sessions as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            println!(
                "   {:<20} {} ({}%)",
                version.product.bright_cyan(),
                format!("{} sessions", version.sessions).bright_white(),
                format!("{:.0}", percentage).bright_yellow()
            );
        }
    }

    fn print_users(&self, users: &[UserUsage]) {
        println!("{}", "Top Power Users by Sessions/Hours".bright_white().bold().underline());
        if users.is_empty() {
            println!("   {}", "No user information".dimmed());
            return;
        }

        for (rank, user) in users.iter().enumerate() {
            println!(
                "   {:>2}. {:<24} {} • {}",
                rank + 1,
                user.username.bright_cyan(),
                format!("{} sessions", user.sessions).bright_white(),
                format!("{} hours", user.hours).bright_green()
            );
        }
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
