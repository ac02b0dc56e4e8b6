//! Historical sliding-window simulator.
//!
//! Slides a fixed-length window across the aligned SPY/UBS history and runs
//! both strategies against the actual prices in each window.

use chrono::{Datelike, NaiveDate};
use rollover_core::{
    config::{Config, HistoricalConfig, WindowStep},
    format_month, Error, PriceSeries, Result,
};
use rollover_ingestion::{align, AlignedSeries, AlignmentReport};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::metrics::SweepSummary;
use crate::prices::WindowPrices;
use crate::strategy::{RunResult, StrategyEngine};

/// Both strategies' outcome for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowResult {
    /// First month of the window.
    #[serde(rename = "date")]
    pub start: NaiveDate,
    /// Last month of the window.
    pub end: NaiveDate,
    /// Contributed by each strategy.
    pub total_invested: f64,
    /// Buy-and-hold terminal value.
    pub spy_final_value: f64,
    /// Bonus-rollover terminal value.
    pub ubs_final_value: f64,
    /// Buy-and-hold annualized return, `None` when undefined.
    pub spy_return: Option<f64>,
    /// Bonus-rollover annualized return, `None` when undefined.
    pub ubs_return: Option<f64>,
}

impl WindowResult {
    fn from_runs(start: NaiveDate, end: NaiveDate, spy: &RunResult, ubs: &RunResult) -> Self {
        Self {
            start,
            end,
            total_invested: spy.total_invested,
            spy_final_value: spy.final_value,
            ubs_final_value: ubs.final_value,
            spy_return: defined_return(start, spy),
            ubs_return: defined_return(start, ubs),
        }
    }

    /// Bonus-rollover return minus buy-and-hold return.
    pub fn spread(&self) -> Option<f64> {
        Some(self.ubs_return? - self.spy_return?)
    }
}

fn defined_return(start: NaiveDate, run: &RunResult) -> Option<f64> {
    match run.annualized_return() {
        Ok(r) => Some(r),
        Err(e) => {
            warn!(window = %format_month(start), strategy = run.strategy.label(), error = %e, "Undefined annualized return");
            None
        }
    }
}

/// A window whose run failed. The sweep continues past it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowFailure {
    /// First month of the window.
    pub start: NaiveDate,
    /// Why the run failed.
    pub reason: String,
}

/// Output of one historical sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoricalReport {
    /// Evaluated windows, chronological.
    pub windows: Vec<WindowResult>,
    /// Windows whose run failed.
    pub failures: Vec<WindowFailure>,
    /// Window starts skipped because the data has a calendar gap.
    pub skipped_gaps: usize,
    /// Months dropped aligning the two series.
    pub alignment: AlignmentReport,
}

impl HistoricalReport {
    /// Win/loss statistics over the evaluated windows.
    pub fn summary(&self) -> SweepSummary {
        SweepSummary::from_windows(&self.windows)
    }
}

/// Runs both strategies over every valid window of the history.
#[derive(Debug, Clone)]
pub struct HistoricalSimulator {
    engine: StrategyEngine,
    settings: HistoricalConfig,
}

impl HistoricalSimulator {
    /// Create a simulator from configuration.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            engine: StrategyEngine::new(config.plan.clone())?,
            settings: config.historical.clone(),
        })
    }

    /// Months per window.
    pub fn window_months(&self) -> usize {
        self.engine.plan().horizon_months
    }

    /// Align the two series and sweep every valid window.
    pub fn run(&self, spy: &PriceSeries, ubs: &PriceSeries) -> Result<HistoricalReport> {
        let aligned = align(spy, ubs);
        self.run_aligned(&aligned)
    }

    /// Sweep an already aligned history.
    pub fn run_aligned(&self, aligned: &AlignedSeries) -> Result<HistoricalReport> {
        let window = self.window_months();
        if aligned.len() < window {
            return Err(Error::insufficient_data(window, aligned.len()));
        }

        let mut report = HistoricalReport {
            alignment: aligned.report.clone(),
            ..Default::default()
        };

        for start in 0..=aligned.len() - window {
            let start_month = aligned.months[start];
            if self.settings.window_step == WindowStep::January && start_month.month() != 1 {
                continue;
            }
            if !aligned.is_contiguous(start, window) {
                debug!(window = %format_month(start_month), "Skipping window spanning a data gap");
                report.skipped_gaps += 1;
                continue;
            }

            let end = start + window;
            let outcome = WindowPrices::new(&aligned.spy[start..end], &aligned.ubs[start..end])
                .and_then(|prices| self.engine.run_both(&prices));

            match outcome {
                Ok((spy_run, ubs_run)) => report.windows.push(WindowResult::from_runs(
                    start_month,
                    aligned.months[end - 1],
                    &spy_run,
                    &ubs_run,
                )),
                Err(e) => {
                    warn!(window = %format_month(start_month), error = %e, "Window run failed");
                    report.failures.push(WindowFailure {
                        start: start_month,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if report.skipped_gaps > 0 {
            warn!(skipped = report.skipped_gaps, "Some windows span gaps in the price data");
        }
        info!(
            windows = report.windows.len(),
            failures = report.failures.len(),
            window_months = window,
            "Historical sweep complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rollover_core::{add_months, Instrument, PricePoint};

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn series(instrument: Instrument, start: NaiveDate, prices: &[f64]) -> PriceSeries {
        let points = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                month: add_months(start, i as u32).unwrap(),
                price,
            })
            .collect();
        PriceSeries::new(instrument, points).unwrap()
    }

    fn rising(months: usize, growth: f64) -> Vec<f64> {
        (0..months).map(|m| 100.0 * growth.powi(m as i32)).collect()
    }

    #[test]
    fn test_exactly_one_window() {
        let sim = HistoricalSimulator::new(&Config::default()).unwrap();
        let spy = series(Instrument::Spy, ym(2000, 1), &rising(72, 1.005));
        let ubs = series(Instrument::Ubs, ym(2000, 1), &rising(72, 1.002));

        let report = sim.run(&spy, &ubs).unwrap();

        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.windows[0].start, ym(2000, 1));
        assert_eq!(report.windows[0].end, ym(2005, 12));
        assert!(report.failures.is_empty());
        assert!(report.alignment.is_exact());
    }

    #[test]
    fn test_71_months_is_insufficient() {
        let sim = HistoricalSimulator::new(&Config::default()).unwrap();
        let spy = series(Instrument::Spy, ym(2000, 1), &rising(71, 1.005));
        let ubs = series(Instrument::Ubs, ym(2000, 1), &rising(71, 1.002));

        assert!(matches!(
            sim.run(&spy, &ubs),
            Err(Error::InsufficientData { required: 72, available: 71 })
        ));
    }

    #[test]
    fn test_monthly_windows_are_chronological() {
        let sim = HistoricalSimulator::new(&Config::default()).unwrap();
        let spy = series(Instrument::Spy, ym(2000, 6), &rising(84, 1.006));
        let ubs = series(Instrument::Ubs, ym(2000, 6), &rising(84, 1.001));

        let report = sim.run(&spy, &ubs).unwrap();

        assert_eq!(report.windows.len(), 13);
        assert!(report.windows.windows(2).all(|w| w[0].start < w[1].start));
        for window in &report.windows {
            assert_eq!(window.total_invested, 36_000.0);
            assert!(window.spy_return.is_some());
            assert!(window.ubs_return.is_some());
        }
    }

    #[test]
    fn test_january_only_windows() {
        let config = Config {
            historical: HistoricalConfig {
                window_step: WindowStep::January,
                ..Default::default()
            },
            ..Default::default()
        };
        let sim = HistoricalSimulator::new(&config).unwrap();
        let spy = series(Instrument::Spy, ym(2000, 6), &rising(84, 1.006));
        let ubs = series(Instrument::Ubs, ym(2000, 6), &rising(84, 1.001));

        let report = sim.run(&spy, &ubs).unwrap();

        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.windows[0].start, ym(2001, 1));
    }

    #[test]
    fn test_partial_overlap_uses_intersection() {
        let sim = HistoricalSimulator::new(&Config::default()).unwrap();
        let spy = series(Instrument::Spy, ym(2000, 1), &rising(80, 1.004));
        let ubs = series(Instrument::Ubs, ym(2000, 5), &rising(72, 1.004));

        let report = sim.run(&spy, &ubs).unwrap();

        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.windows[0].start, ym(2000, 5));
        assert_eq!(report.alignment, AlignmentReport { spy_only: 8, ubs_only: 0 });
    }

    #[test]
    fn test_gap_windows_are_skipped() {
        let sim = HistoricalSimulator::new(&Config::default()).unwrap();
        let prices = rising(73, 1.003);
        let mut points: Vec<PricePoint> = prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                month: add_months(ym(2000, 1), i as u32).unwrap(),
                price,
            })
            .collect();
        // Drop 2000-02 so the first window spans a gap.
        points.remove(1);
        let spy = PriceSeries::new(Instrument::Spy, points.clone()).unwrap();
        let ubs = PriceSeries::new(Instrument::Ubs, points).unwrap();

        let report = sim.run(&spy, &ubs).unwrap();

        assert_eq!(report.skipped_gaps, 1);
        assert_eq!(report.windows.len(), 0);
    }

    #[test]
    fn test_flat_history_returns() {
        let sim = HistoricalSimulator::new(&Config::default()).unwrap();
        let spy = series(Instrument::Spy, ym(2000, 1), &[50.0; 72]);
        let ubs = series(Instrument::Ubs, ym(2000, 1), &[20.0; 72]);

        let report = sim.run(&spy, &ubs).unwrap();
        let window = &report.windows[0];

        assert_relative_eq!(window.spy_return.unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(
            window.ubs_return.unwrap(),
            (4.0f64 / 3.0).powf(1.0 / 6.0) - 1.0,
            max_relative = 1e-12
        );
        assert!(window.spread().unwrap() > 0.0);
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let sim = HistoricalSimulator::new(&Config::default()).unwrap();
        let spy = series(Instrument::Spy, ym(2000, 1), &rising(90, 1.004));
        let ubs = series(Instrument::Ubs, ym(2000, 1), &rising(90, 0.999));

        assert_eq!(sim.run(&spy, &ubs).unwrap(), sim.run(&spy, &ubs).unwrap());
    }

    #[test]
    fn test_bad_price_fails_only_its_window() {
        let months: Vec<NaiveDate> = (0..73).map(|i| add_months(ym(2000, 1), i).unwrap()).collect();
        let mut ubs = vec![100.0; 73];
        ubs[0] = 0.0;
        let aligned = AlignedSeries {
            spy: vec![100.0; 73],
            ubs,
            months,
            report: AlignmentReport::default(),
        };

        let sim = HistoricalSimulator::new(&Config::default()).unwrap();
        let report = sim.run_aligned(&aligned).unwrap();

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].start, ym(2000, 1));
        assert!(report.failures[0].reason.contains("Invalid price"));
        assert_eq!(report.windows.len(), 1);
        assert_eq!(report.windows[0].start, ym(2000, 2));
        assert_eq!(report.windows[0].end, ym(2006, 1));
        assert!(report.windows[0].ubs_return.is_some());
    }

    #[test]
    fn test_sweep_from_parsed_json() {
        let entries: Vec<String> = (0..72)
            .map(|i| {
                let month = add_months(ym(2010, 1), i).unwrap();
                format!("\"{}\": {}", format_month(month), 100.0 + i as f64)
            })
            .collect();
        let text = format!("{{{}}}", entries.join(", "));
        let spy = rollover_ingestion::parse_series(&text, Instrument::Spy, None).unwrap();
        let ubs = rollover_ingestion::parse_series(&text, Instrument::Ubs, None).unwrap();

        let sim = HistoricalSimulator::new(&Config::default()).unwrap();
        let report = sim.run(&spy, &ubs).unwrap();
        let window = &report.windows[0];

        // Same prices for both: only the bonus separates the strategies.
        assert_relative_eq!(
            window.ubs_final_value,
            window.spy_final_value * 4.0 / 3.0,
            max_relative = 1e-12
        );
        assert_eq!(report.summary().ubs_wins, 1);
    }

    #[test]
    fn test_window_serializes_date_key() {
        let window = WindowResult {
            start: ym(2000, 1),
            end: ym(2005, 12),
            total_invested: 36_000.0,
            spy_final_value: 40_000.0,
            ubs_final_value: 0.0,
            spy_return: Some(0.02),
            ubs_return: None,
        };
        let json = serde_json::to_value(&window).unwrap();
        assert_eq!(json["date"], "2000-01-01");
        assert!(json["ubs_return"].is_null());
    }
}
