use anyhow::{Context, Result};
use clap::Parser;

use larder_infra::config;
use larder_reconciliation::ReconcileConfig;

mod cli;
mod scenario;

use cli::{Cli, Commands};
use scenario::Scenario;

fn main() -> Result<()> {
    let cli = Cli::parse();
    larder_observability::tracing::init(cli.log_format);

    let config = load_config(&cli)?;

    match cli.command {
        Commands::Run { scenario, compact } => {
            let scenario = Scenario::load(&scenario)?;
            tracing::info!(
                start = %scenario.range.start(),
                end = %scenario.range.end(),
                batches = scenario.stock.len(),
                entries = scenario.plan.len(),
                "reconciling scenario"
            );
            let report = scenario.run(config)?;
            print_json(&report, compact)
        }
        Commands::Config => print_json(&config, false),
    }
}

fn load_config(cli: &Cli) -> Result<ReconcileConfig> {
    match &cli.config {
        Some(path) => config::load_config(path).with_context(|| format!("loading {}", path.display())),
        None => config::from_env().context("loading config from environment"),
    }
}

fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<()> {
    let out = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{out}");
    Ok(())
}
