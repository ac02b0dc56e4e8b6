//! Configuration structures for the bonus-rollover simulator.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration, passed explicitly into each simulator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Run shape shared by both simulators.
    pub plan: PlanConfig,
    /// Historical sliding-window configuration.
    pub historical: HistoricalConfig,
    /// Fixed-return configuration.
    pub fixed: FixedReturnConfig,
}

impl Config {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.plan.validate()?;
        self.fixed.validate()
    }
}

/// When purchase lots mature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturitySchedule {
    /// Every lot matures at the end of the accumulation phase.
    #[default]
    Synchronized,
    /// Each lot matures `accumulation_months` after its own purchase.
    Staggered,
}

/// Contribution plan and run length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Contribution per accumulation month.
    pub monthly_amount: f64,
    /// Months with contributions. Also the lot holding period.
    pub accumulation_months: usize,
    /// Total months simulated per run.
    pub horizon_months: usize,
    /// Lot maturity schedule.
    pub maturity: MaturitySchedule,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            monthly_amount: 1000.0,
            accumulation_months: 36,
            horizon_months: 72,
            maturity: MaturitySchedule::Synchronized,
        }
    }
}

impl PlanConfig {
    /// Total contributed over the accumulation phase.
    pub fn total_invested(&self) -> f64 {
        self.monthly_amount * self.accumulation_months as f64
    }

    /// Run length in years.
    pub fn horizon_years(&self) -> f64 {
        self.horizon_months as f64 / crate::types::MONTHS_PER_YEAR as f64
    }

    /// Check that the plan describes a runnable schedule.
    pub fn validate(&self) -> Result<()> {
        if !self.monthly_amount.is_finite() || self.monthly_amount <= 0.0 {
            return Err(Error::config(format!(
                "monthly_amount must be positive, got {}",
                self.monthly_amount
            )));
        }
        if self.accumulation_months == 0 {
            return Err(Error::config("accumulation_months must be at least 1"));
        }
        if self.horizon_months <= self.accumulation_months {
            return Err(Error::config(format!(
                "horizon_months ({}) must exceed accumulation_months ({})",
                self.horizon_months, self.accumulation_months
            )));
        }
        if self.maturity == MaturitySchedule::Staggered
            && self.horizon_months < 2 * self.accumulation_months
        {
            return Err(Error::config(format!(
                "staggered maturity needs horizon_months >= {} so every lot matures",
                2 * self.accumulation_months
            )));
        }
        Ok(())
    }
}

/// Which window starts the historical sweep evaluates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStep {
    /// Every month.
    #[default]
    Monthly,
    /// Only windows starting in January.
    January,
}

/// Historical sliding-window configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalConfig {
    /// SPY price file.
    pub spy_path: Option<PathBuf>,
    /// UBS price file.
    pub ubs_path: Option<PathBuf>,
    /// Ignore data before this month.
    pub start_month: Option<NaiveDate>,
    /// Window start cadence.
    pub window_step: WindowStep,
}

/// Fixed-return configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedReturnConfig {
    /// Annual SPY return as a fraction (0.10 = 10%).
    pub spy_rate: f64,
    /// Annual UBS return as a fraction.
    pub ubs_rate: f64,
    /// SPY price at month 0.
    pub spy_base_price: f64,
    /// UBS price at month 0.
    pub ubs_base_price: f64,
    /// Calendar month labeling month 0 of the trajectory.
    pub start_month: Option<NaiveDate>,
}

impl Default for FixedReturnConfig {
    fn default() -> Self {
        Self {
            spy_rate: 0.10,
            ubs_rate: 0.0,
            spy_base_price: 1.0,
            ubs_base_price: 1.0,
            start_month: None,
        }
    }
}

impl FixedReturnConfig {
    /// Check base prices and rates.
    pub fn validate(&self) -> Result<()> {
        for (name, price) in [("spy_base_price", self.spy_base_price), ("ubs_base_price", self.ubs_base_price)] {
            if !price.is_finite() || price <= 0.0 {
                return Err(Error::config(format!("{name} must be positive, got {price}")));
            }
        }
        for (name, rate) in [("spy_rate", self.spy_rate), ("ubs_rate", self.ubs_rate)] {
            if !rate.is_finite() || rate <= -1.0 {
                return Err(Error::config(format!("{name} must be greater than -1, got {rate}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.plan.monthly_amount, 1000.0);
        assert_eq!(config.plan.accumulation_months, 36);
        assert_eq!(config.plan.horizon_months, 72);
        assert_eq!(config.plan.total_invested(), 36_000.0);
        assert_eq!(config.plan.horizon_years(), 6.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_horizon_years_fractional() {
        let plan = PlanConfig {
            accumulation_months: 12,
            horizon_months: 30,
            ..PlanConfig::default()
        };
        assert_relative_eq!(plan.horizon_years(), 2.5);
        assert_relative_eq!(plan.total_invested(), 12_000.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"plan": {"monthly_amount": 500}, "historical": {"window_step": "january"}}"#,
        )
        .unwrap();
        assert_eq!(config.plan.monthly_amount, 500.0);
        assert_eq!(config.plan.horizon_months, 72);
        assert_eq!(config.historical.window_step, WindowStep::January);
    }

    #[test]
    fn test_horizon_must_exceed_accumulation() {
        let plan = PlanConfig {
            horizon_months: 36,
            ..Default::default()
        };
        assert!(plan.validate().is_err());
    }

    #[test]
    fn test_staggered_needs_long_horizon() {
        let plan = PlanConfig {
            maturity: MaturitySchedule::Staggered,
            horizon_months: 60,
            ..Default::default()
        };
        assert!(plan.validate().is_err());

        let plan = PlanConfig {
            maturity: MaturitySchedule::Staggered,
            ..Default::default()
        };
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_rate_bounds() {
        let fixed = FixedReturnConfig {
            ubs_rate: -1.0,
            ..Default::default()
        };
        assert!(fixed.validate().is_err());
    }
}
