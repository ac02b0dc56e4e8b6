//! Core data types for the bonus-rollover simulator.

use chrono::{DateTime, Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Regular shares per bonus share granted under the bonus plan.
pub const BONUS_DIVISOR: f64 = 3.0;

/// Months per year, for annualizing.
pub const MONTHS_PER_YEAR: usize = 12;

/// Normalize a date to the first day of its month.
#[inline]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Months since year 0, used to test calendar adjacency.
#[inline]
pub fn month_ordinal(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

/// Shift a month key forward by `n` months.
pub fn add_months(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    month_start(date).checked_add_months(Months::new(n))
}

/// Convert a Unix timestamp (seconds) to its UTC month key.
pub fn month_from_unix(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| month_start(dt.date_naive()))
}

/// Parse `YYYY-MM`, `YYYY-MM-DD` or an RFC 3339 timestamp into a month key.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    let date = if s.len() == 7 {
        NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d")
    } else {
        NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d")
    };
    date.map(month_start)
        .map_err(|e| Error::data(format!("invalid month '{s}': {e}")))
}

/// Format a month key as `YYYY-MM`.
pub fn format_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// The two instruments compared by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    /// Broad-market index fund held by both strategies.
    Spy,
    /// Employer stock bought under the bonus-share plan.
    Ubs,
}

impl Instrument {
    /// Ticker symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Instrument::Spy => "SPY",
            Instrument::Ubs => "UBS",
        }
    }
}

/// Strategy being simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Contribute monthly into SPY and hold.
    BuyAndHold,
    /// Contribute monthly into UBS with bonus shares, roll into SPY at maturity.
    BonusRollover,
}

impl Strategy {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Strategy::BuyAndHold => "SPY Strategy",
            Strategy::BonusRollover => "UBS Bonus Strategy",
        }
    }
}

/// One monthly closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// First day of the month.
    pub month: NaiveDate,
    /// Closing price.
    pub price: f64,
}

/// Validated monthly price series for one instrument.
///
/// Months are strictly increasing and every price is finite and positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    instrument: Instrument,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting unordered months or unusable prices.
    pub fn new(instrument: Instrument, points: Vec<PricePoint>) -> Result<Self> {
        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(Error::data(format!(
                    "{}: price {} at {} must be positive",
                    instrument.symbol(),
                    point.price,
                    format_month(point.month)
                )));
            }
            if i > 0 && points[i - 1].month >= point.month {
                return Err(Error::data(format!(
                    "{}: months not strictly increasing at {}",
                    instrument.symbol(),
                    format_month(point.month)
                )));
            }
        }
        Ok(Self { instrument, points })
    }

    /// Instrument this series prices.
    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// All points in month order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of months.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First month, if any.
    pub fn first_month(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.month)
    }

    /// Last month, if any.
    pub fn last_month(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.month)
    }

    /// Price for a month, if present.
    pub fn price_at(&self, month: NaiveDate) -> Option<f64> {
        let month = month_start(month);
        self.points
            .binary_search_by_key(&month, |p| p.month)
            .ok()
            .map(|i| self.points[i].price)
    }
}
