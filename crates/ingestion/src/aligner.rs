//! Two-instrument alignment.
//!
//! Intersects the SPY and UBS series by calendar month so both strategies see
//! the same months.

use chrono::NaiveDate;
use rollover_core::{format_month, month_ordinal, PriceSeries};
use serde::Serialize;
use tracing::warn;

/// Months dropped by the intersection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentReport {
    /// Months present only in the SPY series.
    pub spy_only: usize,
    /// Months present only in the UBS series.
    pub ubs_only: usize,
}

impl AlignmentReport {
    /// Whether both series covered exactly the same months.
    pub fn is_exact(&self) -> bool {
        self.spy_only == 0 && self.ubs_only == 0
    }
}

/// Price columns for the months both instruments share.
#[derive(Debug, Clone, Default)]
pub struct AlignedSeries {
    /// Shared months, ascending.
    pub months: Vec<NaiveDate>,
    /// SPY close per shared month.
    pub spy: Vec<f64>,
    /// UBS close per shared month.
    pub ubs: Vec<f64>,
    /// What the intersection dropped.
    pub report: AlignmentReport,
}

impl AlignedSeries {
    /// Number of shared months.
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Whether no months are shared.
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Whether `len` months starting at `start` are consecutive calendar months.
    pub fn is_contiguous(&self, start: usize, len: usize) -> bool {
        let Some(window) = self.months.get(start..start + len) else {
            return false;
        };
        window
            .windows(2)
            .all(|pair| month_ordinal(pair[1]) - month_ordinal(pair[0]) == 1)
    }
}

/// Intersect two series by month.
///
/// A mismatch is logged and reported, never fatal.
pub fn align(spy: &PriceSeries, ubs: &PriceSeries) -> AlignedSeries {
    let mut aligned = AlignedSeries::default();
    for point in spy.points() {
        match ubs.price_at(point.month) {
            Some(ubs_price) => {
                aligned.months.push(point.month);
                aligned.spy.push(point.price);
                aligned.ubs.push(ubs_price);
            }
            None => aligned.report.spy_only += 1,
        }
    }
    aligned.report.ubs_only = ubs.len() - aligned.months.len();

    if !aligned.report.is_exact() {
        warn!(
            spy_only = aligned.report.spy_only,
            ubs_only = aligned.report.ubs_only,
            first = ?aligned.months.first().map(|m| format_month(*m)),
            last = ?aligned.months.last().map(|m| format_month(*m)),
            "Price series do not cover the same months, using their intersection"
        );
    }

    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollover_core::{Instrument, PricePoint};

    fn ym(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn series(instrument: Instrument, months: &[(i32, u32)], price: f64) -> PriceSeries {
        let points = months
            .iter()
            .map(|&(y, m)| PricePoint { month: ym(y, m), price })
            .collect();
        PriceSeries::new(instrument, points).unwrap()
    }

    #[test]
    fn test_exact_overlap() {
        let months = [(2000, 1), (2000, 2), (2000, 3)];
        let aligned = align(
            &series(Instrument::Spy, &months, 10.0),
            &series(Instrument::Ubs, &months, 5.0),
        );

        assert_eq!(aligned.len(), 3);
        assert!(aligned.report.is_exact());
        assert_eq!(aligned.spy, vec![10.0; 3]);
        assert_eq!(aligned.ubs, vec![5.0; 3]);
    }

    #[test]
    fn test_partial_overlap_is_intersected() {
        let spy = series(Instrument::Spy, &[(2000, 1), (2000, 2), (2000, 3)], 10.0);
        let ubs = series(Instrument::Ubs, &[(2000, 2), (2000, 3), (2000, 4), (2000, 5)], 5.0);
        let aligned = align(&spy, &ubs);

        assert_eq!(aligned.months, vec![ym(2000, 2), ym(2000, 3)]);
        assert_eq!(aligned.report, AlignmentReport { spy_only: 1, ubs_only: 2 });
        assert!(!aligned.report.is_exact());
    }

    #[test]
    fn test_contiguity() {
        let months = [(2000, 11), (2000, 12), (2001, 1), (2001, 3)];
        let aligned = align(
            &series(Instrument::Spy, &months, 10.0),
            &series(Instrument::Ubs, &months, 5.0),
        );

        assert!(aligned.is_contiguous(0, 3));
        assert!(!aligned.is_contiguous(1, 3));
        assert!(!aligned.is_contiguous(2, 5));
    }
}
