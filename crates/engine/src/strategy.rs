//! Strategy runs over one horizon.
//!
//! Both strategies contribute the same amount over the same accumulation
//! months, so their terminal values compare directly:
//! - Buy-and-hold buys SPY each accumulation month and holds.
//! - Bonus-rollover buys UBS lots with bonus shares, sells them at maturity
//!   and moves the proceeds into SPY.

use rollover_core::{
    config::{MaturitySchedule, PlanConfig},
    Error, Instrument, Result, Strategy, MONTHS_PER_YEAR,
};
use serde::Serialize;
use tracing::trace;

use crate::lots::BonusLotTracker;
use crate::prices::PriceSource;

/// Holdings of one strategy at a given month.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StrategyState {
    /// SPY shares held.
    pub spy_shares: f64,
    /// UBS shares held across unmatured lots, bonus included.
    pub ubs_shares: f64,
    /// Proceeds waiting to be reinvested.
    pub cash: f64,
}

impl StrategyState {
    /// Move pending cash into SPY at `spy_price`.
    fn reinvest(&mut self, spy_price: f64) {
        if self.cash > 0.0 {
            self.spy_shares += self.cash / spy_price;
            self.cash = 0.0;
        }
    }
}

/// Portfolio composition at the end of one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthSnapshot {
    /// Run month.
    pub month: usize,
    /// Value of SPY shares.
    pub spy_value: f64,
    /// Value of open UBS lots.
    pub ubs_value: f64,
    /// Uninvested cash.
    pub cash: f64,
}

impl MonthSnapshot {
    /// Total portfolio value.
    #[inline]
    pub fn total(&self) -> f64 {
        self.spy_value + self.ubs_value + self.cash
    }
}

/// Outcome of one strategy over one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Strategy simulated.
    pub strategy: Strategy,
    /// Total contributed.
    pub total_invested: f64,
    /// Portfolio value at the last month.
    pub final_value: f64,
    /// Purchase lots created (bonus-rollover only).
    pub lots_created: usize,
    /// Month-by-month composition.
    pub trajectory: Vec<MonthSnapshot>,
}

impl RunResult {
    /// Final value over total invested.
    pub fn total_return(&self) -> Result<f64> {
        if self.total_invested <= 0.0 {
            return Err(Error::math_domain("total invested must be positive"));
        }
        Ok(self.final_value / self.total_invested - 1.0)
    }

    /// Geometric mean yearly return over the run.
    pub fn annualized_return(&self) -> Result<f64> {
        annualized_return(self.final_value, self.total_invested, self.trajectory.len())
    }
}

/// `(terminal / invested) ^ (1 / years) - 1`.
///
/// Undefined (`MathDomain`) when either value is non-positive or non-finite.
pub fn annualized_return(terminal_value: f64, total_invested: f64, horizon_months: usize) -> Result<f64> {
    if !total_invested.is_finite() || total_invested <= 0.0 {
        return Err(Error::math_domain(format!(
            "total invested must be positive, got {total_invested}"
        )));
    }
    if !terminal_value.is_finite() || terminal_value <= 0.0 {
        return Err(Error::math_domain(format!(
            "terminal value must be positive, got {terminal_value}"
        )));
    }
    if horizon_months == 0 {
        return Err(Error::math_domain("horizon must be at least one month"));
    }

    let years = horizon_months as f64 / MONTHS_PER_YEAR as f64;
    Ok((terminal_value / total_invested).powf(1.0 / years) - 1.0)
}

/// Runs both strategies for a contribution plan.
#[derive(Debug, Clone)]
pub struct StrategyEngine {
    plan: PlanConfig,
}

impl StrategyEngine {
    /// Create an engine, validating the plan.
    pub fn new(plan: PlanConfig) -> Result<Self> {
        plan.validate()?;
        Ok(Self { plan })
    }

    /// The plan being simulated.
    pub fn plan(&self) -> &PlanConfig {
        &self.plan
    }

    /// Run both strategies against the same prices.
    pub fn run_both(&self, prices: &impl PriceSource) -> Result<(RunResult, RunResult)> {
        Ok((self.run_buy_and_hold(prices)?, self.run_bonus_rollover(prices)?))
    }

    /// Buy SPY each accumulation month, then hold.
    pub fn run_buy_and_hold(&self, prices: &impl PriceSource) -> Result<RunResult> {
        self.check_length(prices)?;
        let plan = &self.plan;
        let mut state = StrategyState::default();
        let mut trajectory = Vec::with_capacity(plan.horizon_months);

        for month in 0..plan.horizon_months {
            let spy_price = prices.price(Instrument::Spy, month)?;
            if month < plan.accumulation_months {
                state.spy_shares += plan.monthly_amount / spy_price;
            }
            trajectory.push(MonthSnapshot {
                month,
                spy_value: state.spy_shares * spy_price,
                ubs_value: 0.0,
                cash: state.cash,
            });
        }

        Ok(self.finish(Strategy::BuyAndHold, trajectory, 0))
    }

    /// Buy UBS lots each accumulation month, roll matured lots into SPY.
    pub fn run_bonus_rollover(&self, prices: &impl PriceSource) -> Result<RunResult> {
        self.check_length(prices)?;
        let plan = &self.plan;
        let mut tracker = BonusLotTracker::new(plan.accumulation_months, plan.maturity);
        let mut state = StrategyState::default();
        let mut trajectory = Vec::with_capacity(plan.horizon_months);

        for month in 0..plan.horizon_months {
            let spy_price = prices.price(Instrument::Spy, month)?;
            let ubs_price = prices.price(Instrument::Ubs, month)?;

            if month < plan.accumulation_months {
                tracker.add_lot(month, plan.monthly_amount, ubs_price)?;
            }

            let proceeds = match plan.maturity {
                MaturitySchedule::Synchronized if month == plan.accumulation_months => {
                    tracker.mature_all(month, ubs_price)?
                }
                MaturitySchedule::Staggered if month >= plan.accumulation_months => {
                    tracker.mature_due(month, ubs_price)?
                }
                _ => 0.0,
            };
            if proceeds > 0.0 {
                trace!(month, proceeds, spy_price, "Rolling proceeds into SPY");
            }
            state.cash += proceeds;
            state.reinvest(spy_price);
            state.ubs_shares = tracker.open_shares();

            trajectory.push(MonthSnapshot {
                month,
                spy_value: state.spy_shares * spy_price,
                ubs_value: state.ubs_shares * ubs_price,
                cash: state.cash,
            });
        }

        Ok(self.finish(Strategy::BonusRollover, trajectory, tracker.lots_created()))
    }

    fn check_length(&self, prices: &impl PriceSource) -> Result<()> {
        if prices.months() < self.plan.horizon_months {
            return Err(Error::insufficient_data(self.plan.horizon_months, prices.months()));
        }
        Ok(())
    }

    fn finish(&self, strategy: Strategy, trajectory: Vec<MonthSnapshot>, lots_created: usize) -> RunResult {
        RunResult {
            strategy,
            total_invested: self.plan.total_invested(),
            final_value: trajectory.last().map_or(0.0, MonthSnapshot::total),
            lots_created,
            trajectory,
        }
    }
}
