//! Steam Stats Library
//!
//! Analysis of application usage session logs. Given a CSV with one row per usage
//! session, this library derives the tables of a usage dashboard: daily peak usage,
//! summary KPIs, usage per product version, and the most active users.
//!
//! ## Core Features
//!
//! - **Tolerant loading**: Missing columns and unparsable cells never abort a load
//! - **Day expansion**: Each finished session counts toward every calendar day it spans
//! - **Date-range presets**: Windows anchored on the log's own launch dates
//! - **Flexible output formats**: JSON and human-readable reports, CSV export
//!
//! ## Architecture Overview
//!
//! - [`models`] - Session rows and the derived report tables
//! - [`loader`] - CSV reading into a [`SessionTable`]
//! - [`timeline`] - Date-range presets and filtering
//! - [`peak`] - Daily presence expansion and aggregation
//! - [`summary`] - KPI table
//! - [`breakdown`] - Version and user breakdowns
//! - [`analyzer`] - Pipeline orchestration for the CLI commands
//! - [`display`] - Terminal and JSON output
//! - [`export`] - CSV export of derived tables
//! - [`config`] - Configuration management with environment variable support
//! - [`logging`] - Structured logging with JSON and pretty-print formats
//!
//! ## Main Entry Point
//!
//! ```rust,no_run
//! use steam_stats::{loader, StatsAnalyzer, Timeline};
//! use steam_stats::config::Config;
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let analyzer = StatsAnalyzer::new(Config::default());
//! let table = loader::load_sessions(Path::new("sessions.csv"))?;
//! let report = analyzer.build_report(&table, Timeline::RecentMonth);
//!
//! for day in &report.peak_usage {
//!     println!("{} {}", day.day_present, day.peak_sessions);
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod breakdown;
pub mod config;
pub mod display;
pub mod export;
pub mod loader;
pub mod logging;
pub mod models;
pub mod peak;
pub mod summary;
pub mod timeline;
pub mod timestamp_parser;

pub use analyzer::{ProcessOptions, ReportKind, StatsAnalyzer};
pub use models::*;
pub use timeline::Timeline;
