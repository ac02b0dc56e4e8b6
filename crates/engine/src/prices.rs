//! Per-month price sources for a single run.

use rollover_core::{Error, Instrument, Result, MONTHS_PER_YEAR};

/// Prices indexed by run month (0 = first month of the run).
pub trait PriceSource {
    /// Months available.
    fn months(&self) -> usize;

    /// Price of `instrument` at run month `month`.
    fn price(&self, instrument: Instrument, month: usize) -> Result<f64>;
}

/// A slice of the aligned historical series.
#[derive(Debug, Clone, Copy)]
pub struct WindowPrices<'a> {
    spy: &'a [f64],
    ubs: &'a [f64],
}

impl<'a> WindowPrices<'a> {
    /// Wrap two equally long price columns.
    pub fn new(spy: &'a [f64], ubs: &'a [f64]) -> Result<Self> {
        if spy.len() != ubs.len() {
            return Err(Error::data(format!(
                "window columns differ in length: SPY {} vs UBS {}",
                spy.len(),
                ubs.len()
            )));
        }
        Ok(Self { spy, ubs })
    }
}

impl PriceSource for WindowPrices<'_> {
    fn months(&self) -> usize {
        self.spy.len()
    }

    fn price(&self, instrument: Instrument, month: usize) -> Result<f64> {
        let column = match instrument {
            Instrument::Spy => self.spy,
            Instrument::Ubs => self.ubs,
        };
        let price = *column
            .get(month)
            .ok_or_else(|| Error::insufficient_data(month + 1, column.len()))?;
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::invalid_price(month, price));
        }
        Ok(price)
    }
}

/// Convert an annual return to the equivalent compounded monthly return.
#[inline]
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / MONTHS_PER_YEAR as f64) - 1.0
}

/// Prices grown at constant annual rates from fixed base prices.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticPrices {
    spy: Vec<f64>,
    ubs: Vec<f64>,
}

impl SyntheticPrices {
    /// Generate `months` prices per instrument, each compounding independently.
    pub fn new(
        months: usize,
        spy_rate: f64,
        ubs_rate: f64,
        spy_base_price: f64,
        ubs_base_price: f64,
    ) -> Result<Self> {
        Ok(Self {
            spy: generate(months, spy_rate, spy_base_price)?,
            ubs: generate(months, ubs_rate, ubs_base_price)?,
        })
    }

    /// Generated SPY prices.
    pub fn spy(&self) -> &[f64] {
        &self.spy
    }

    /// Generated UBS prices.
    pub fn ubs(&self) -> &[f64] {
        &self.ubs
    }
}

impl PriceSource for SyntheticPrices {
    fn months(&self) -> usize {
        self.spy.len()
    }

    fn price(&self, instrument: Instrument, month: usize) -> Result<f64> {
        let column = match instrument {
            Instrument::Spy => &self.spy,
            Instrument::Ubs => &self.ubs,
        };
        column
            .get(month)
            .copied()
            .ok_or_else(|| Error::insufficient_data(month + 1, column.len()))
    }
}

fn generate(months: usize, annual_rate: f64, base_price: f64) -> Result<Vec<f64>> {
    if !base_price.is_finite() || base_price <= 0.0 {
        return Err(Error::invalid_price(0, base_price));
    }
    if !annual_rate.is_finite() || annual_rate <= -1.0 {
        return Err(Error::config(format!("annual rate must exceed -100%, got {annual_rate}")));
    }

    let growth = 1.0 + monthly_rate(annual_rate);
    let mut prices = Vec::with_capacity(months);
    let mut price = base_price;
    for _ in 0..months {
        prices.push(price);
        price *= growth;
    }
    Ok(prices)
}
