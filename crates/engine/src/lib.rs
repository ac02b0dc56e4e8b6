//! Simulation engine for the bonus-rollover simulator.
//!
//! This crate provides:
//! - Bonus-share purchase lot tracking and maturation
//! - Buy-and-hold and bonus-rollover strategy runs over one horizon
//! - Historical sliding-window sweeps and fixed-return trajectories
//! - Win/loss statistics over a sweep

pub mod fixed_return;
pub mod historical;
pub mod lots;
pub mod metrics;
pub mod prices;
pub mod strategy;

pub use fixed_return::{FixedReturnReport, FixedReturnSimulator};
pub use historical::{HistoricalReport, HistoricalSimulator, WindowResult};
pub use lots::{BonusLotTracker, PurchaseLot};
pub use metrics::SweepSummary;
pub use prices::{PriceSource, SyntheticPrices, WindowPrices};
pub use strategy::{annualized_return, MonthSnapshot, RunResult, StrategyEngine};
