//! Flow-style series: independent sums per period.

use std::collections::HashSet;

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, CurrencyId};
use tracing::debug;

use super::error::SeriesError;
use super::period::{Period, PeriodWindow};
use super::{PeriodSeries, entry_value};
use crate::currency::{CurrencyInfo, ExchangeRateConverter};
use crate::policy::{ConversionPolicy, SignMode};
use crate::transaction::{TransactionRecord, TransactionType};

/// Direction of money in an income/expense chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    /// Money coming in.
    Earned,
    /// Money going out.
    Spent,
}

impl FlowKind {
    /// Classifies a record relative to a set of accounts.
    ///
    /// Deposits are earned. Transfers, reconciliations and opening balances
    /// are earned when their destination is one of `accounts`. Everything
    /// else is spent.
    #[must_use]
    pub fn of(record: &TransactionRecord, accounts: &[AccountId]) -> Self {
        let earned = record.transaction_type == TransactionType::Deposit
            || (record.transaction_type.is_internal()
                && accounts.contains(&record.destination_account_id));
        if earned { Self::Earned } else { Self::Spent }
    }

    /// Sign applied to amounts of this kind.
    #[must_use]
    pub const fn sign(self) -> SignMode {
        match self {
            Self::Earned => SignMode::Positive,
            Self::Spent => SignMode::Negative,
        }
    }
}

/// One line of an income/expense chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartDataset {
    /// "earned" or "spent".
    pub label: FlowKind,
    /// Values.
    #[serde(flatten)]
    pub series: PeriodSeries,
}

/// Exact per-label sums for one currency.
struct Accumulator {
    currency: CurrencyInfo,
    native: IndexMap<String, BigDecimal>,
    pc: IndexMap<String, BigDecimal>,
}

impl Accumulator {
    fn new(currency: CurrencyInfo) -> Self {
        Self {
            currency,
            native: IndexMap::new(),
            pc: IndexMap::new(),
        }
    }

    fn add_native(&mut self, label: &str, amount: BigDecimal) {
        *self.native.entry(label.to_string()).or_default() += amount;
    }

    fn add_pc(&mut self, label: &str, amount: BigDecimal) {
        *self.pc.entry(label.to_string()).or_default() += amount;
    }

    /// Gap-filled, rounded series over `windows`.
    fn emit(
        &self,
        windows: &[PeriodWindow],
        primary: Option<&CurrencyInfo>,
        period: Period,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PeriodSeries, SeriesError> {
        let zero = BigDecimal::zero();
        let mut series = PeriodSeries::new(self.currency.clone(), primary.cloned(), period, start, end);
        for window in windows {
            let value = self.native.get(&window.label).unwrap_or(&zero);
            series
                .entries
                .insert(window.label.clone(), entry_value(value, &self.currency)?);

            if let Some(primary) = primary {
                let converted = self.pc.get(&window.label).unwrap_or(&zero);
                series
                    .pc_entries
                    .insert(window.label.clone(), entry_value(converted, primary)?);
            }
        }
        Ok(series)
    }
}

/// Builds per-period sums from transaction records.
#[derive(Debug, Clone, Copy)]
pub struct FlowSeriesBuilder<'a> {
    policy: &'a ConversionPolicy,
    converter: &'a ExchangeRateConverter<'a>,
}

impl<'a> FlowSeriesBuilder<'a> {
    /// Creates a builder.
    #[must_use]
    pub const fn new(policy: &'a ConversionPolicy, converter: &'a ExchangeRateConverter<'a>) -> Self {
        Self { policy, converter }
    }

    /// Sums per native currency and period.
    ///
    /// When converting, `pc_entries` hold the primary currency amount of the
    /// same records. When not converting, a foreign leg is summed as its own
    /// currency. Periods without records report zero; records outside every
    /// period are skipped.
    ///
    /// # Errors
    ///
    /// Returns `SeriesError::Record` if a record breaks the ledger contract,
    /// `SeriesError::Overflow` if a rounded sum does not fit an entry.
    pub fn sums(
        &self,
        records: &[TransactionRecord],
        sign: SignMode,
        start: NaiveDate,
        end: NaiveDate,
        period: Period,
    ) -> Result<IndexMap<CurrencyId, PeriodSeries>, SeriesError> {
        let windows = period.windows(start, end);
        if windows.is_empty() {
            return Ok(IndexMap::new());
        }

        let convert = self.policy.convert_to_primary();
        let converting = self.policy.ignoring_preferences(true);
        self.prepare(&converting, records);

        let labels = window_labels(&windows);
        let mut accumulators: IndexMap<CurrencyId, Accumulator> = IndexMap::new();
        for record in records {
            record.validate()?;
            let label = period.label(record.as_of());
            if !labels.contains(label.as_str()) {
                debug!(
                    journal_id = %record.journal_id,
                    %label,
                    "Record outside requested periods, skipping"
                );
                continue;
            }
            let native = record.native_currency();
            let accumulator = accumulators
                .entry(native.id)
                .or_insert_with(|| Accumulator::new(native));
            accumulator.add_native(&label, sign.apply(&record.amount));

            if convert {
                let resolved = converting.resolve(record, self.converter)?;
                accumulator.add_pc(&label, sign.apply(&resolved.main.amount));
            } else if let Some((foreign, amount)) = record
                .foreign_leg()?
                .filter(|(currency, _)| currency.id != record.currency_id)
            {
                accumulators
                    .entry(foreign.id)
                    .or_insert_with(|| Accumulator::new(foreign))
                    .add_native(&label, sign.apply(&amount));
            }
        }

        let primary = convert.then(|| self.policy.primary());
        debug!(currencies = accumulators.len(), periods = windows.len(), "Built flow series");
        accumulators
            .into_iter()
            .map(|(id, accumulator)| Ok((id, accumulator.emit(&windows, primary, period, start, end)?)))
            .collect()
    }

    /// Earned and spent datasets per native currency.
    ///
    /// The primary currency always gets a pair of datasets, even without
    /// records. Every dataset covers every period.
    ///
    /// # Errors
    ///
    /// Returns `SeriesError::Record` if a record breaks the ledger contract,
    /// `SeriesError::Overflow` if a rounded sum does not fit an entry.
    pub fn income_and_expense(
        &self,
        records: &[TransactionRecord],
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
        period: Period,
    ) -> Result<Vec<ChartDataset>, SeriesError> {
        let windows = period.windows(start, end);
        if windows.is_empty() {
            return Ok(Vec::new());
        }

        let convert = self.policy.convert_to_primary();
        let converting = self.policy.ignoring_preferences(true);
        self.prepare(&converting, records);

        let labels = window_labels(&windows);
        let mut accumulators: IndexMap<(CurrencyId, FlowKind), Accumulator> = IndexMap::new();
        insert_pair(&mut accumulators, self.policy.primary());

        for record in records {
            record.validate()?;
            let native = record.native_currency();
            insert_pair(&mut accumulators, &native);

            let kind = FlowKind::of(record, accounts);
            let label = period.label(record.as_of());
            if !labels.contains(label.as_str()) {
                debug!(
                    journal_id = %record.journal_id,
                    %label,
                    "Record outside requested periods, skipping"
                );
                continue;
            }
            let Some(accumulator) = accumulators.get_mut(&(native.id, kind)) else {
                continue;
            };
            accumulator.add_native(&label, kind.sign().apply(&record.amount));

            if convert {
                let resolved = converting.resolve(record, self.converter)?;
                accumulator.add_pc(&label, kind.sign().apply(&resolved.main.amount));
            }
        }

        let primary = convert.then(|| self.policy.primary());
        debug!(datasets = accumulators.len(), periods = windows.len(), "Built income/expense chart");
        accumulators
            .into_iter()
            .map(|((_, kind), accumulator)| {
                Ok(ChartDataset {
                    label: kind,
                    series: accumulator.emit(&windows, primary, period, start, end)?,
                })
            })
            .collect()
    }

    fn prepare(&self, converting: &ConversionPolicy, records: &[TransactionRecord]) {
        if !self.policy.convert_to_primary() {
            return;
        }
        let pairs: Vec<(CurrencyInfo, NaiveDate)> = records
            .iter()
            .filter(|record| converting.needs_rate(record))
            .map(|record| (record.native_currency(), record.as_of()))
            .collect();
        self.converter.prepare(
            pairs.iter().map(|(currency, date)| (currency, *date)),
            converting.primary(),
        );
    }
}

fn window_labels(windows: &[PeriodWindow]) -> HashSet<&str> {
    windows.iter().map(|window| window.label.as_str()).collect()
}

fn insert_pair(accumulators: &mut IndexMap<(CurrencyId, FlowKind), Accumulator>, currency: &CurrencyInfo) {
    for kind in [FlowKind::Earned, FlowKind::Spent] {
        accumulators
            .entry((currency.id, kind))
            .or_insert_with(|| Accumulator::new(currency.clone()));
    }
}
