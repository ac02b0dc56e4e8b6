//! Command-line arguments and their merge onto the file configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rollover_core::{
    config::{MaturitySchedule, WindowStep},
    parse_month, Config,
};

/// Compare a bonus-share rollover plan against buy-and-hold.
#[derive(Debug, Parser)]
#[command(name = "rollover", version, about)]
pub struct Cli {
    /// JSON configuration file. Flags override its values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Contribution per accumulation month.
    #[arg(long, global = true)]
    pub monthly_amount: Option<f64>,

    /// Months with contributions (also the lot holding period).
    #[arg(long, global = true)]
    pub accumulation_months: Option<usize>,

    /// Total months per run.
    #[arg(long, global = true)]
    pub horizon_months: Option<usize>,

    /// Mature each lot on its own anniversary instead of all at once.
    #[arg(long, global = true)]
    pub staggered: bool,

    /// Write the presentation series as JSON to this file.
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sweep a sliding window across historical prices.
    Historical {
        /// SPY monthly prices (ISO month map or Yahoo chart JSON).
        #[arg(long)]
        spy: Option<PathBuf>,

        /// UBS monthly prices (ISO month map or Yahoo chart JSON).
        #[arg(long)]
        ubs: Option<PathBuf>,

        /// Only start windows in January.
        #[arg(long)]
        january_only: bool,

        /// Ignore data before this month (YYYY-MM).
        #[arg(long)]
        start: Option<String>,
    },

    /// Run one horizon with constant annual returns.
    Fixed {
        /// Annual SPY return as a fraction (0.08 = 8%).
        #[arg(long, allow_negative_numbers = true)]
        spy_rate: Option<f64>,

        /// Annual UBS return as a fraction.
        #[arg(long, allow_negative_numbers = true)]
        ubs_rate: Option<f64>,

        /// Calendar month of the first run month (YYYY-MM).
        #[arg(long)]
        start: Option<String>,
    },
}

impl Cli {
    /// Load the configuration file, if any, and apply flag overrides.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(amount) = self.monthly_amount {
            config.plan.monthly_amount = amount;
        }
        if let Some(months) = self.accumulation_months {
            config.plan.accumulation_months = months;
        }
        if let Some(months) = self.horizon_months {
            config.plan.horizon_months = months;
        }
        if self.staggered {
            config.plan.maturity = MaturitySchedule::Staggered;
        }

        match &self.command {
            Command::Historical { spy, ubs, january_only, start } => {
                if let Some(path) = spy {
                    config.historical.spy_path = Some(path.clone());
                }
                if let Some(path) = ubs {
                    config.historical.ubs_path = Some(path.clone());
                }
                if *january_only {
                    config.historical.window_step = WindowStep::January;
                }
                if let Some(start) = start {
                    config.historical.start_month = Some(parse_month(start)?);
                }
            }
            Command::Fixed { spy_rate, ubs_rate, start } => {
                if let Some(rate) = spy_rate {
                    config.fixed.spy_rate = *rate;
                }
                if let Some(rate) = ubs_rate {
                    config.fixed.ubs_rate = *rate;
                }
                if let Some(start) = start {
                    config.fixed.start_month = Some(parse_month(start)?);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_flags_override_defaults() {
        let cli = Cli::parse_from([
            "rollover",
            "--monthly-amount",
            "250",
            "fixed",
            "--spy-rate",
            "0.08",
            "--ubs-rate",
            "-0.02",
        ]);
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.plan.monthly_amount, 250.0);
        assert_eq!(config.fixed.spy_rate, 0.08);
        assert_eq!(config.fixed.ubs_rate, -0.02);
        assert_eq!(config.plan.horizon_months, 72);
    }

    #[test]
    fn test_historical_flags() {
        let cli = Cli::parse_from([
            "rollover",
            "historical",
            "--spy",
            "spy.json",
            "--ubs",
            "ubs.json",
            "--january-only",
            "--start",
            "2000-06",
            "--staggered",
        ]);
        let config = cli.resolve_config().unwrap();

        assert_eq!(config.historical.spy_path, Some(PathBuf::from("spy.json")));
        assert_eq!(config.historical.window_step, WindowStep::January);
        assert_eq!(config.plan.maturity, MaturitySchedule::Staggered);
        assert_eq!(config.historical.start_month, parse_month("2000-06").ok());
    }

    #[test]
    fn test_invalid_plan_rejected() {
        let cli = Cli::parse_from(["rollover", "--horizon-months", "30", "fixed"]);
        assert!(cli.resolve_config().is_err());
    }
}
