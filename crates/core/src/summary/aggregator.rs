//! Transaction summarizer.

use chrono::NaiveDate;
use tracing::debug;

use super::bucket::{BucketMap, GroupSlot};
use super::error::SummaryError;
use super::grouping::{Direction, by_account, by_currency};
use crate::currency::{CurrencyInfo, ExchangeRateConverter};
use crate::policy::{ConversionPolicy, SignMode};
use crate::transaction::TransactionRecord;

/// Options for [`TransactionSummarizer::aggregate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Count the separate foreign leg when not converting.
    pub include_foreign: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            include_foreign: true,
        }
    }
}

/// Folds records into currency buckets under one conversion policy.
///
/// Stateless between calls: every aggregation owns its buckets. Only the
/// converter's rate cache is shared, and it is safe to share.
#[derive(Debug, Clone, Copy)]
pub struct TransactionSummarizer<'a> {
    policy: &'a ConversionPolicy,
    converter: &'a ExchangeRateConverter<'a>,
}

impl<'a> TransactionSummarizer<'a> {
    /// Creates a summarizer.
    #[must_use]
    pub const fn new(policy: &'a ConversionPolicy, converter: &'a ExchangeRateConverter<'a>) -> Self {
        Self { policy, converter }
    }

    /// The policy in use.
    #[must_use]
    pub const fn policy(&self) -> &'a ConversionPolicy {
        self.policy
    }

    /// The converter in use.
    #[must_use]
    pub const fn converter(&self) -> &'a ExchangeRateConverter<'a> {
        self.converter
    }

    /// Same converter, different policy.
    #[must_use]
    pub const fn with_policy(&self, policy: &'a ConversionPolicy) -> Self {
        Self {
            policy,
            converter: self.converter,
        }
    }

    /// Aggregates records, counting foreign legs.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` if a record breaks the ledger contract.
    pub fn aggregate<F>(
        &self,
        records: &[TransactionRecord],
        key_fn: F,
        sign: SignMode,
    ) -> Result<BucketMap, SummaryError>
    where
        F: Fn(&TransactionRecord, &CurrencyInfo) -> Vec<GroupSlot>,
    {
        self.aggregate_with(records, key_fn, sign, AggregateOptions::default())
    }

    /// Aggregates records.
    ///
    /// Every record contributes its main leg and, when not converting and
    /// `include_foreign` is set, its foreign leg as a separate contribution.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` if a record breaks the ledger contract.
    pub fn aggregate_with<F>(
        &self,
        records: &[TransactionRecord],
        key_fn: F,
        sign: SignMode,
        options: AggregateOptions,
    ) -> Result<BucketMap, SummaryError>
    where
        F: Fn(&TransactionRecord, &CurrencyInfo) -> Vec<GroupSlot>,
    {
        debug!(
            records = records.len(),
            ?sign,
            include_foreign = options.include_foreign,
            convert_to_primary = self.policy.convert_to_primary(),
            "Aggregating transactions"
        );
        self.prepare(records);

        let mut buckets = BucketMap::new();
        for record in records {
            record.validate()?;
            let resolved = self.policy.resolve(record, self.converter)?;
            for leg in resolved.legs(options.include_foreign) {
                let amount = sign.apply(&leg.amount);
                for slot in key_fn(record, &leg.currency) {
                    buckets.add(slot, &leg.currency, &amount);
                }
            }
        }

        debug!(buckets = buckets.len(), "Aggregation finished");
        Ok(buckets)
    }

    /// Sums per currency.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` if a record breaks the ledger contract.
    pub fn group_by_currency_id(
        &self,
        records: &[TransactionRecord],
        sign: SignMode,
        include_foreign: bool,
    ) -> Result<BucketMap, SummaryError> {
        self.aggregate_with(records, by_currency(), sign, AggregateOptions { include_foreign })
    }

    /// Sums per (account on one side, currency), carrying the account name.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` if a record breaks the ledger contract.
    pub fn group_by_direction(
        &self,
        records: &[TransactionRecord],
        sign: SignMode,
        direction: Direction,
    ) -> Result<BucketMap, SummaryError> {
        self.aggregate(records, by_account(direction), sign)
    }

    /// Warms the rate cache for records that will need a conversion.
    fn prepare(&self, records: &[TransactionRecord]) {
        if !self.policy.convert_to_primary() {
            return;
        }
        let pairs: Vec<(CurrencyInfo, NaiveDate)> = records
            .iter()
            .filter(|record| self.policy.needs_rate(record))
            .map(|record| (record.native_currency(), record.as_of()))
            .collect();
        if pairs.is_empty() {
            return;
        }
        self.converter.prepare(
            pairs.iter().map(|(currency, date)| (currency, *date)),
            self.policy.primary(),
        );
    }
}
