//! Fixed-return simulator.
//!
//! Runs one horizon with prices grown at constant annual rates and keeps the
//! full monthly trajectory of both strategies for stacked-area charts.

use chrono::NaiveDate;
use rollover_core::{
    add_months,
    config::{Config, FixedReturnConfig},
    Result, Strategy,
};
use serde::Serialize;
use tracing::info;

use crate::prices::SyntheticPrices;
use crate::strategy::{RunResult, StrategyEngine};

/// Buy-and-hold value at one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpyValuePoint {
    /// Run month.
    pub month: usize,
    /// Calendar month, when a start month is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Portfolio value.
    pub spy_value: f64,
}

/// Bonus-rollover composition at one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UbsValuePoint {
    /// Run month.
    pub month: usize,
    /// Calendar month, when a start month is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Value still held in UBS lots.
    pub ubs_shares_value: f64,
    /// Value already rolled into SPY.
    pub spy_shares_value: f64,
}

/// Both trajectories for one fixed-return run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedReturnReport {
    /// Annual SPY return used.
    pub spy_rate: f64,
    /// Annual UBS return used.
    pub ubs_rate: f64,
    /// Calendar month of run month 0.
    pub start_month: Option<NaiveDate>,
    /// Buy-and-hold run.
    pub spy: RunResult,
    /// Bonus-rollover run.
    pub ubs: RunResult,
    /// Buy-and-hold annualized return, `None` when undefined.
    pub spy_annualized: Option<f64>,
    /// Bonus-rollover annualized return, `None` when undefined.
    pub ubs_annualized: Option<f64>,
}

impl FixedReturnReport {
    fn date_of(&self, month: usize) -> Option<NaiveDate> {
        self.start_month
            .and_then(|start| add_months(start, u32::try_from(month).ok()?))
    }

    /// Buy-and-hold value per month.
    pub fn spy_series(&self) -> Vec<SpyValuePoint> {
        self.spy
            .trajectory
            .iter()
            .map(|snap| SpyValuePoint {
                month: snap.month,
                date: self.date_of(snap.month),
                spy_value: snap.total(),
            })
            .collect()
    }

    /// Bonus-rollover value per month, split by asset.
    pub fn ubs_series(&self) -> Vec<UbsValuePoint> {
        self.ubs
            .trajectory
            .iter()
            .map(|snap| UbsValuePoint {
                month: snap.month,
                date: self.date_of(snap.month),
                ubs_shares_value: snap.ubs_value,
                spy_shares_value: snap.spy_value + snap.cash,
            })
            .collect()
    }

    /// Strategy with the higher final value, `None` on a tie.
    pub fn winner(&self) -> Option<Strategy> {
        if self.spy.final_value > self.ubs.final_value {
            Some(Strategy::BuyAndHold)
        } else if self.ubs.final_value > self.spy.final_value {
            Some(Strategy::BonusRollover)
        } else {
            None
        }
    }

    /// Absolute difference between the final values.
    pub fn margin(&self) -> f64 {
        (self.spy.final_value - self.ubs.final_value).abs()
    }
}

/// Runs both strategies against constant-growth prices.
#[derive(Debug, Clone)]
pub struct FixedReturnSimulator {
    engine: StrategyEngine,
    settings: FixedReturnConfig,
}

impl FixedReturnSimulator {
    /// Create a simulator from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.fixed.validate()?;
        Ok(Self {
            engine: StrategyEngine::new(config.plan.clone())?,
            settings: config.fixed.clone(),
        })
    }

    /// Run with the configured rates.
    pub fn run_configured(&self) -> Result<FixedReturnReport> {
        self.run(self.settings.spy_rate, self.settings.ubs_rate)
    }

    /// Run with the given annual rates (0.08 = 8%).
    pub fn run(&self, spy_rate: f64, ubs_rate: f64) -> Result<FixedReturnReport> {
        let prices = SyntheticPrices::new(
            self.engine.plan().horizon_months,
            spy_rate,
            ubs_rate,
            self.settings.spy_base_price,
            self.settings.ubs_base_price,
        )?;
        let (spy, ubs) = self.engine.run_both(&prices)?;

        let report = FixedReturnReport {
            spy_rate,
            ubs_rate,
            start_month: self.settings.start_month,
            spy_annualized: spy.annualized_return().ok(),
            ubs_annualized: ubs.annualized_return().ok(),
            spy,
            ubs,
        };
        info!(
            spy_rate,
            ubs_rate,
            spy_final = report.spy.final_value,
            ubs_final = report.ubs.final_value,
            "Fixed-return run complete"
        );
        Ok(report)
    }
}
