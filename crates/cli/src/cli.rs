use std::path::PathBuf;

use clap::{Parser, Subcommand};
use larder_observability::LogFormat;

/// larder - pantry stock and meal plan reconciliation
#[derive(Parser, Debug)]
#[command(name = "larder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a JSON config file (falls back to LARDER_CONFIG, then defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format on stderr: json or compact
    #[arg(long, global = true, default_value = "json")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile a scenario file and print the run report
    Run {
        /// Scenario JSON (stock, recipes, plan, range)
        #[arg(short, long)]
        scenario: PathBuf,

        /// Print the report on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Print the effective configuration
    Config,
}
