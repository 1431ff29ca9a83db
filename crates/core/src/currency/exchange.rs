//! Exchange rate types and lookup.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::CurrencyId;

use super::directory::CurrencyInfo;
use super::error::CurrencyError;

/// Exchange rate between two currencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Source currency.
    pub from_currency: CurrencyId,
    /// Target currency.
    pub to_currency: CurrencyId,
    /// Exchange rate (1 from_currency = rate to_currency).
    pub rate: Decimal,
    /// Date this rate is effective.
    pub effective_date: NaiveDate,
}

impl ExchangeRate {
    /// Creates a new exchange rate.
    #[must_use]
    pub const fn new(
        from_currency: CurrencyId,
        to_currency: CurrencyId,
        rate: Decimal,
        effective_date: NaiveDate,
    ) -> Self {
        Self {
            from_currency,
            to_currency,
            rate,
            effective_date,
        }
    }

    /// Returns the inverse rate, or `None` for a zero rate.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let rate = Decimal::ONE.checked_div(self.rate)?;
        Some(Self {
            from_currency: self.to_currency,
            to_currency: self.from_currency,
            rate,
            effective_date: self.effective_date,
        })
    }
}

/// Source of exchange rates (database, remote API, fixture).
///
/// Implementations may fail; callers in this crate never propagate that
/// failure into a report, they fall back to a rate of 1.
pub trait RateProvider: Send + Sync {
    /// Returns the rate to convert one unit of `from` into `to` as of `date`.
    fn find_rate(
        &self,
        from: &CurrencyInfo,
        to: &CurrencyInfo,
        date: NaiveDate,
    ) -> Result<Decimal, CurrencyError>;
}

/// Rate provider over a fixed set of rates.
///
/// Lookup priority:
/// 1. Direct rate (from -> to) effective on or before the date
/// 2. Inverse of the reverse pair (to -> from)
/// 3. Triangulation through the pivot currency, if one is set
#[derive(Debug, Clone, Default)]
pub struct InMemoryRateProvider {
    rates: Vec<ExchangeRate>,
    pivot: Option<CurrencyId>,
}

impl InMemoryRateProvider {
    /// Creates a provider from a list of rates.
    #[must_use]
    pub fn new(rates: Vec<ExchangeRate>) -> Self {
        Self { rates, pivot: None }
    }

    /// Enables triangulation through the given currency.
    #[must_use]
    pub fn with_pivot(mut self, pivot: CurrencyId) -> Self {
        self.pivot = Some(pivot);
        self
    }

    /// Adds a rate.
    pub fn insert(&mut self, rate: ExchangeRate) {
        self.rates.push(rate);
    }

    fn latest(&self, from: CurrencyId, to: CurrencyId, date: NaiveDate) -> Option<&ExchangeRate> {
        self.rates
            .iter()
            .filter(|r| r.from_currency == from && r.to_currency == to && r.effective_date <= date)
            .max_by_key(|r| r.effective_date)
    }

    fn direct_or_inverse(&self, from: CurrencyId, to: CurrencyId, date: NaiveDate) -> Option<Decimal> {
        if from == to {
            return Some(Decimal::ONE);
        }
        if let Some(direct) = self.latest(from, to, date) {
            return Some(direct.rate);
        }
        self.latest(to, from, date)
            .and_then(ExchangeRate::inverse)
            .map(|inverse| inverse.rate)
    }
}

impl RateProvider for InMemoryRateProvider {
    fn find_rate(
        &self,
        from: &CurrencyInfo,
        to: &CurrencyInfo,
        date: NaiveDate,
    ) -> Result<Decimal, CurrencyError> {
        if let Some(rate) = self.direct_or_inverse(from.id, to.id, date) {
            return Ok(rate);
        }

        if let Some(pivot) = self.pivot.filter(|p| *p != from.id && *p != to.id) {
            let first = self.direct_or_inverse(from.id, pivot, date);
            let second = self.direct_or_inverse(pivot, to.id, date);
            if let (Some(first), Some(second)) = (first, second) {
                return Ok(first * second);
            }
        }

        Err(CurrencyError::RateNotFound {
            from: from.code.clone(),
            to: to.code.clone(),
            date,
        })
    }
}
