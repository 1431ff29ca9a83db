//! Balance-style series: last known balance carried forward.

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CurrencyId, exact, serialize_plain};
use tracing::debug;

use super::error::SeriesError;
use super::period::Period;
use super::{PeriodSeries, entry_value};
use crate::currency::{CurrencyDirectory, CurrencyInfo, ExchangeRateConverter};
use crate::policy::ConversionPolicy;

/// Running balance of one currency as of a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// Date the balance is valid from.
    pub date: NaiveDate,
    /// Currency of the balance.
    pub currency_id: CurrencyId,
    /// Balance, at ledger precision.
    #[serde(serialize_with = "serialize_plain")]
    pub balance: BigDecimal,
}

impl BalanceSnapshot {
    /// Creates a snapshot.
    #[must_use]
    pub fn new(date: NaiveDate, currency_id: CurrencyId, balance: Decimal) -> Self {
        Self {
            date,
            currency_id,
            balance: exact(balance),
        }
    }
}

/// Builds "balance as of the end of each period" series.
#[derive(Clone, Copy)]
pub struct BalanceSeriesBuilder<'a> {
    directory: &'a dyn CurrencyDirectory,
    policy: &'a ConversionPolicy,
    converter: &'a ExchangeRateConverter<'a>,
}

impl<'a> BalanceSeriesBuilder<'a> {
    /// Creates a builder.
    #[must_use]
    pub const fn new(
        directory: &'a dyn CurrencyDirectory,
        policy: &'a ConversionPolicy,
        converter: &'a ExchangeRateConverter<'a>,
    ) -> Self {
        Self {
            directory,
            policy,
            converter,
        }
    }

    /// One series per snapshot currency, in order of first appearance.
    ///
    /// A snapshot is adopted by the first period whose end is on or after
    /// its date and carried forward until superseded. Periods before the
    /// first snapshot report zero. `start > end` yields no series.
    ///
    /// # Errors
    ///
    /// Returns `SeriesError::Currency` if a snapshot's currency is unknown,
    /// `SeriesError::Overflow` if a rounded balance does not fit an entry.
    pub fn build(
        &self,
        snapshots: &[BalanceSnapshot],
        start: NaiveDate,
        end: NaiveDate,
        period: Period,
    ) -> Result<IndexMap<CurrencyId, PeriodSeries>, SeriesError> {
        let windows = period.windows(start, end);
        if windows.is_empty() {
            return Ok(IndexMap::new());
        }

        let mut by_currency: IndexMap<CurrencyId, Vec<&BalanceSnapshot>> = IndexMap::new();
        for snapshot in snapshots {
            by_currency.entry(snapshot.currency_id).or_default().push(snapshot);
        }

        let currencies = by_currency
            .keys()
            .map(|id| self.directory.resolve(*id))
            .collect::<Result<Vec<CurrencyInfo>, _>>()?;

        let primary = self.policy.primary();
        let convert = self.policy.convert_to_primary();
        if convert {
            self.converter.prepare(
                currencies
                    .iter()
                    .flat_map(|currency| windows.iter().map(move |w| (currency, w.end))),
                primary,
            );
        }

        let mut result = IndexMap::with_capacity(currencies.len());
        for (currency, mut history) in currencies.into_iter().zip(by_currency.into_values()) {
            history.sort_by_key(|snapshot| snapshot.date);

            let mut series = PeriodSeries::new(currency, convert.then(|| primary.clone()), period, start, end);
            let mut pending = history.into_iter().peekable();
            let zero = BigDecimal::zero();
            let mut last = &zero;

            for window in &windows {
                while let Some(snapshot) = pending.next_if(|s| s.date <= window.end) {
                    last = &snapshot.balance;
                }
                let value = entry_value(last, &series.currency)?;
                series.entries.insert(window.label.clone(), value);

                if convert {
                    let converted = self.converter.convert(last, &series.currency, primary, window.end);
                    let value = entry_value(&converted, primary)?;
                    series.pc_entries.insert(window.label.clone(), value);
                }
            }

            debug!(
                currency = %series.currency.code,
                periods = series.entries.len(),
                "Built balance series"
            );
            result.insert(series.currency.id, series);
        }

        Ok(result)
    }
}
