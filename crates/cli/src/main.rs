//! Command-line driver for the bonus-rollover simulator.
//!
//! Loads configuration and price files, runs one of the simulators, prints a
//! summary and optionally writes the presentation series as JSON.

mod args;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use rollover_core::{Config, Instrument};
use rollover_engine::{FixedReturnSimulator, HistoricalSimulator};
use rollover_ingestion::load_series;
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command};

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    match cli.command {
        Command::Historical { .. } => run_historical(&config, cli.output.as_deref()),
        Command::Fixed { .. } => run_fixed(&config, cli.output.as_deref()),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_historical(config: &Config, output: Option<&std::path::Path>) -> Result<()> {
    let settings = &config.historical;
    let spy_path = settings
        .spy_path
        .as_ref()
        .context("no SPY price file given (--spy or historical.spy_path)")?;
    let ubs_path = settings
        .ubs_path
        .as_ref()
        .context("no UBS price file given (--ubs or historical.ubs_path)")?;

    let spy = load_series(spy_path, Instrument::Spy, settings.start_month)
        .with_context(|| format!("loading {}", spy_path.display()))?;
    let ubs = load_series(ubs_path, Instrument::Ubs, settings.start_month)
        .with_context(|| format!("loading {}", ubs_path.display()))?;

    let simulator = HistoricalSimulator::new(config)?;
    let result = simulator.run(&spy, &ubs)?;

    report::print_historical(config, &result);
    if let Some(path) = output {
        report::write_historical(path, &result)?;
    }
    Ok(())
}

fn run_fixed(config: &Config, output: Option<&std::path::Path>) -> Result<()> {
    let simulator = FixedReturnSimulator::new(config)?;
    let result = simulator.run_configured()?;

    report::print_fixed(config, &result);
    if let Some(path) = output {
        report::write_fixed(path, &result)?;
    }
    Ok(())
}
