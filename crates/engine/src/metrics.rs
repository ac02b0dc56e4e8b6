//! Sweep statistics.
//!
//! Summarizes a historical sweep: return ranges per strategy and how often
//! the bonus-rollover strategy beat buy-and-hold.

use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::Serialize;
use statrs::statistics::Statistics;

use crate::historical::WindowResult;

/// Annualized return statistics for one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnStats {
    /// Windows with a defined return.
    pub count: usize,
    /// Lowest annualized return.
    pub min: f64,
    /// Highest annualized return.
    pub max: f64,
    /// Mean annualized return.
    pub mean: f64,
    /// Sample standard deviation (0 with a single window).
    pub std_dev: f64,
}

impl ReturnStats {
    /// Compute over the defined returns, `None` if there are none.
    pub fn from_returns(returns: &[f64]) -> Option<Self> {
        if returns.is_empty() {
            return None;
        }
        let std_dev = if returns.len() > 1 {
            Statistics::std_dev(returns.iter())
        } else {
            0.0
        };
        Some(Self {
            count: returns.len(),
            min: Statistics::min(returns.iter()),
            max: Statistics::max(returns.iter()),
            mean: Statistics::mean(returns.iter()),
            std_dev,
        })
    }
}

/// Window with an extreme bonus-rollover advantage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpreadExtreme {
    /// First month of the window.
    pub start: NaiveDate,
    /// Bonus-rollover return minus buy-and-hold return.
    pub spread: f64,
}

/// Win/loss statistics over a historical sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepSummary {
    /// Windows evaluated.
    pub windows: usize,
    /// Windows where either return was undefined.
    pub undefined: usize,
    /// Buy-and-hold return statistics.
    pub spy: Option<ReturnStats>,
    /// Bonus-rollover return statistics.
    pub ubs: Option<ReturnStats>,
    /// Windows buy-and-hold won.
    pub spy_wins: usize,
    /// Windows bonus-rollover won.
    pub ubs_wins: usize,
    /// Windows with equal returns.
    pub ties: usize,
    /// Buy-and-hold wins over compared windows (0-1).
    pub spy_win_rate: f64,
    /// Bonus-rollover wins over compared windows (0-1).
    pub ubs_win_rate: f64,
    /// Window where bonus-rollover did best relative to buy-and-hold.
    pub best_spread: Option<SpreadExtreme>,
    /// Window where bonus-rollover did worst relative to buy-and-hold.
    pub worst_spread: Option<SpreadExtreme>,
}

impl SweepSummary {
    /// Summarize evaluated windows.
    pub fn from_windows(windows: &[WindowResult]) -> Self {
        let mut summary = SweepSummary {
            windows: windows.len(),
            ..Default::default()
        };
        if windows.is_empty() {
            return summary;
        }

        let spy_returns: Vec<f64> = windows.iter().filter_map(|w| w.spy_return).collect();
        let ubs_returns: Vec<f64> = windows.iter().filter_map(|w| w.ubs_return).collect();
        summary.spy = ReturnStats::from_returns(&spy_returns);
        summary.ubs = ReturnStats::from_returns(&ubs_returns);

        for window in windows {
            match (window.spy_return, window.ubs_return) {
                (Some(spy), Some(ubs)) if spy > ubs => summary.spy_wins += 1,
                (Some(spy), Some(ubs)) if ubs > spy => summary.ubs_wins += 1,
                (Some(_), Some(_)) => summary.ties += 1,
                _ => summary.undefined += 1,
            }
        }

        let compared = summary.spy_wins + summary.ubs_wins + summary.ties;
        if compared > 0 {
            summary.spy_win_rate = summary.spy_wins as f64 / compared as f64;
            summary.ubs_win_rate = summary.ubs_wins as f64 / compared as f64;
        }

        let spreads: Vec<(OrderedFloat<f64>, NaiveDate)> = windows
            .iter()
            .filter_map(|w| w.spread().map(|s| (OrderedFloat(s), w.start)))
            .collect();
        let to_extreme = |(spread, start): &(OrderedFloat<f64>, NaiveDate)| SpreadExtreme {
            start: *start,
            spread: spread.into_inner(),
        };
        summary.best_spread = spreads.iter().max().map(to_extreme);
        summary.worst_spread = spreads.iter().min().map(to_extreme);

        summary
    }

    /// Compared windows (both returns defined).
    pub fn compared(&self) -> usize {
        self.spy_wins + self.ubs_wins + self.ties
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn window(month: u32, spy: Option<f64>, ubs: Option<f64>) -> WindowResult {
        let start = NaiveDate::from_ymd_opt(2000, month, 1).unwrap();
        WindowResult {
            start,
            end: start,
            total_invested: 36_000.0,
            spy_final_value: 0.0,
            ubs_final_value: 0.0,
            spy_return: spy,
            ubs_return: ubs,
        }
    }

    #[test]
    fn test_win_counts() {
        let windows = vec![
            window(1, Some(0.05), Some(0.08)), // UBS
            window(2, Some(0.10), Some(0.04)), // SPY
            window(3, Some(0.06), Some(0.09)), // UBS
            window(4, Some(0.03), Some(0.03)), // Tie
        ];

        let summary = SweepSummary::from_windows(&windows);

        assert_eq!(summary.windows, 4);
        assert_eq!(summary.ubs_wins, 2);
        assert_eq!(summary.spy_wins, 1);
        assert_eq!(summary.ties, 1);
        assert_relative_eq!(summary.ubs_win_rate, 0.5);
        assert_relative_eq!(summary.spy_win_rate, 0.25);
    }

    #[test]
    fn test_return_stats() {
        let windows = vec![
            window(1, Some(0.02), Some(0.01)),
            window(2, Some(0.04), Some(0.05)),
            window(3, Some(0.06), Some(0.03)),
        ];

        let summary = SweepSummary::from_windows(&windows);
        let spy = summary.spy.unwrap();

        assert_eq!(spy.count, 3);
        assert_relative_eq!(spy.min, 0.02);
        assert_relative_eq!(spy.max, 0.06);
        assert_relative_eq!(spy.mean, 0.04, epsilon = 1e-12);
        assert_relative_eq!(spy.std_dev, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn test_spread_extremes() {
        let windows = vec![
            window(1, Some(0.05), Some(0.08)),
            window(2, Some(0.10), Some(0.04)),
            window(3, Some(0.06), Some(0.07)),
        ];

        let summary = SweepSummary::from_windows(&windows);

        let best = summary.best_spread.unwrap();
        assert_eq!(best.start, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert_relative_eq!(best.spread, 0.03, epsilon = 1e-12);
        let worst = summary.worst_spread.unwrap();
        assert_eq!(worst.start, NaiveDate::from_ymd_opt(2000, 2, 1).unwrap());
    }

    #[test]
    fn test_undefined_returns_excluded() {
        let windows = vec![
            window(1, Some(0.05), None),
            window(2, Some(0.10), Some(0.12)),
        ];

        let summary = SweepSummary::from_windows(&windows);

        assert_eq!(summary.undefined, 1);
        assert_eq!(summary.compared(), 1);
        assert_eq!(summary.ubs.unwrap().count, 1);
        assert_eq!(summary.spy.unwrap().count, 2);
        assert_relative_eq!(summary.ubs_win_rate, 1.0);
    }

    #[test]
    fn test_empty_sweep() {
        let summary = SweepSummary::from_windows(&[]);
        assert_eq!(summary.windows, 0);
        assert!(summary.spy.is_none());
        assert!(summary.best_spread.is_none());
    }
}
