//! Bonus-share purchase lot tracking.
//!
//! Each accumulation month buys one lot of UBS shares. A lot earns one bonus
//! share per three regular shares and is sold in full when it matures.

use rollover_core::{config::MaturitySchedule, Error, Result, BONUS_DIVISOR};
use serde::Serialize;
use tracing::debug;

/// One month's contribution into UBS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseLot {
    /// Run month the lot was bought in.
    pub purchase_month: usize,
    /// UBS price paid.
    pub purchase_price: f64,
    /// Amount contributed.
    pub amount: f64,
    /// Shares bought with the contribution.
    pub regular_shares: f64,
    /// Bonus shares granted on top, `regular_shares / 3`.
    pub bonus_shares: f64,
    /// Run month the lot is sold in.
    pub maturity_month: usize,
}

impl PurchaseLot {
    /// Create a lot, rejecting non-positive prices.
    pub fn new(month: usize, amount: f64, price: f64, maturity_month: usize) -> Result<Self> {
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::invalid_price(month, price));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::data(format!(
                "contribution at month {month} must be non-negative, got {amount}"
            )));
        }

        let regular_shares = amount / price;
        Ok(Self {
            purchase_month: month,
            purchase_price: price,
            amount,
            regular_shares,
            bonus_shares: regular_shares / BONUS_DIVISOR,
            maturity_month,
        })
    }

    /// Regular plus bonus shares.
    #[inline]
    pub fn total_shares(&self) -> f64 {
        self.regular_shares + self.bonus_shares
    }

    /// Whether the lot is due at `month`.
    #[inline]
    pub fn is_due(&self, month: usize) -> bool {
        self.maturity_month <= month
    }
}

/// Open purchase lots for one bonus-rollover run.
#[derive(Debug, Clone)]
pub struct BonusLotTracker {
    /// Lots not yet sold.
    lots: Vec<PurchaseLot>,
    /// Months a lot is held (the accumulation length).
    holding_months: usize,
    /// When lots mature.
    schedule: MaturitySchedule,
    /// Lots created over the run.
    lots_created: usize,
}

impl BonusLotTracker {
    /// Create an empty tracker.
    pub fn new(holding_months: usize, schedule: MaturitySchedule) -> Self {
        Self {
            lots: Vec::with_capacity(holding_months),
            holding_months,
            schedule,
            lots_created: 0,
        }
    }

    /// Maturity month for a lot bought at `month`.
    pub fn maturity_for(&self, month: usize) -> usize {
        match self.schedule {
            MaturitySchedule::Synchronized => self.holding_months.max(month),
            MaturitySchedule::Staggered => month + self.holding_months,
        }
    }

    /// Buy a lot with `amount` at `price`.
    pub fn add_lot(&mut self, month: usize, amount: f64, price: f64) -> Result<&PurchaseLot> {
        let lot = PurchaseLot::new(month, amount, price, self.maturity_for(month))?;
        self.lots.push(lot);
        self.lots_created += 1;
        Ok(&self.lots[self.lots.len() - 1])
    }

    /// Sell every open lot at `price` and return the proceeds.
    ///
    /// On an invalid price the lots are left untouched.
    pub fn mature_all(&mut self, month: usize, price: f64) -> Result<f64> {
        check_price(month, price)?;

        let shares = self.open_shares();
        let proceeds = shares * price;
        debug!(month, lots = self.lots.len(), shares, proceeds, "Matured all lots");
        self.lots.clear();
        Ok(proceeds)
    }

    /// Sell the lots due at `month` and return the proceeds.
    pub fn mature_due(&mut self, month: usize, price: f64) -> Result<f64> {
        check_price(month, price)?;

        let mut shares = 0.0;
        let mut matured = 0usize;
        self.lots.retain(|lot| {
            if lot.is_due(month) {
                shares += lot.total_shares();
                matured += 1;
                false
            } else {
                true
            }
        });

        let proceeds = shares * price;
        if matured > 0 {
            debug!(month, lots = matured, shares, proceeds, "Matured due lots");
        }
        Ok(proceeds)
    }

    /// Open lots in purchase order.
    pub fn lots(&self) -> &[PurchaseLot] {
        &self.lots
    }

    /// Number of open lots.
    pub fn len(&self) -> usize {
        self.lots.len()
    }

    /// Whether no lots are open.
    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    /// Lots created since the tracker was built.
    pub fn lots_created(&self) -> usize {
        self.lots_created
    }

    /// Regular plus bonus shares across open lots.
    pub fn open_shares(&self) -> f64 {
        self.lots.iter().map(PurchaseLot::total_shares).sum()
    }

    /// Regular shares across open lots.
    pub fn open_regular_shares(&self) -> f64 {
        self.lots.iter().map(|lot| lot.regular_shares).sum()
    }
}

fn check_price(month: usize, price: f64) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(Error::invalid_price(month, price));
    }
    Ok(())
}
