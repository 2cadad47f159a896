use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::Instrument;

use steam_stats::config::init_config;
use steam_stats::display::ReportDisplayManager;
use steam_stats::logging::{init_logging, run_span};
use steam_stats::{ProcessOptions, ReportKind, StatsAnalyzer, Timeline};

#[derive(Parser)]
#[command(name = "steam-stats")]
#[command(about = "Peak daily usage, version usage and top users from a sessions CSV")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Sessions CSV to analyze
    file: PathBuf,
    /// Date range applied before aggregation
    #[arg(long, value_enum, default_value_t = Timeline::All)]
    range: Timeline,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct ExportArgs {
    /// Write the table as CSV (to the data directory when no path is given)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    export: Option<Option<PathBuf>>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the full dashboard: summary, peak usage, versions and top users
    Report {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Show the summary KPIs
    Summary {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Show peak usage by day
    Peak {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Show session counts per product version
    Versions {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Show the users with the most sessions
    Users {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        export: ExportArgs,
        /// Show top N users
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the raw (filtered) dataset
    Table {
        #[command(flatten)]
        input: InputArgs,
        /// Show first N rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// List the available date ranges
    Ranges {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn json(&self) -> bool {
        match self {
            Commands::Report { input, .. }
            | Commands::Summary { input, .. }
            | Commands::Peak { input, .. }
            | Commands::Versions { input, .. }
            | Commands::Users { input, .. }
            | Commands::Table { input, .. } => input.json,
            Commands::Ranges { json } => *json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let json = cli.command.json();

    let config = match init_config() {
        Ok(config) => config,
        Err(e) => handle_error(e, json),
    };
    let _log_guard = init_logging(config);

    let options = match cli.command {
        Commands::Ranges { json } => {
            return match ReportDisplayManager::new(config.output.json_pretty).display_ranges(json) {
                Ok(()) => Ok(()),
                Err(e) => handle_error(e, json),
            };
        }
        Commands::Report { input, export } => {
            build_options(ReportKind::Report, input, export.export, None)
        }
        Commands::Summary { input, export } => {
            build_options(ReportKind::Summary, input, export.export, None)
        }
        Commands::Peak { input, export } => {
            build_options(ReportKind::Peak, input, export.export, None)
        }
        Commands::Versions { input, export } => {
            build_options(ReportKind::Versions, input, export.export, None)
        }
        Commands::Users { input, export, limit } => {
            build_options(ReportKind::Users, input, export.export, limit)
        }
        Commands::Table { input, limit } => build_options(ReportKind::Table, input, None, limit),
    };

    if !config.output.color || json {
        colored::control::set_override(false);
    }

    let analyzer = StatsAnalyzer::new(config.clone());
    let span = run_span(options.command.name());
    match analyzer.run_command(options).instrument(span).await {
        Ok(()) => Ok(()),
        Err(e) => handle_error(e, json),
    }
}

fn build_options(
    command: ReportKind,
    input: InputArgs,
    export: Option<Option<PathBuf>>,
    limit: Option<usize>,
) -> ProcessOptions {
    ProcessOptions {
        command,
        input: input.file,
        timeline: input.range,
        json_output: input.json,
        limit,
        export,
    }
}

fn handle_error(e: anyhow::Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    process::exit(1);
}
