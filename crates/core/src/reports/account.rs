//! Account reports: sums per opposing account, transfers, listings.

use chrono::NaiveDate;
use indexmap::IndexMap;
use tally_shared::types::{AccountId, CurrencyId, plain};
use tracing::debug;

use super::context::ReportContext;
use super::error::ReportError;
use super::query::JournalFilter;
use super::types::{
    AccountReport, AccountSumEntry, CurrencyJournals, JournalLine, TransferEntry, average,
};
use crate::policy::SignMode;
use crate::summary::{
    AggregateOptions, BucketMap, Direction, GroupSlot, SortOrder, SumEntry, TransactionSummarizer,
    by_account,
};
use crate::transaction::{TransactionRecord, TransactionType};

/// Account-centric reports.
#[derive(Clone, Copy)]
pub struct AccountReports<'a> {
    context: &'a ReportContext<'a>,
}

impl<'a> AccountReports<'a> {
    /// Creates the façade.
    #[must_use]
    pub const fn new(context: &'a ReportContext<'a>) -> Self {
        Self { context }
    }

    /// Money leaving `accounts`, per destination account and native currency.
    ///
    /// Covers withdrawals and transfers to accounts outside the set. Rows
    /// are sorted smallest (largest expense) first.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn expense_report(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AccountReport, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Withdrawal, TransactionType::Transfer])
            .source_accounts(accounts)
            .exclude_destination(accounts);
        let records = self.context.journals(&filter)?;
        self.opposing_report(&records, Direction::Destination, SignMode::Negative, SortOrder::Ascending)
    }

    /// Money arriving in `accounts`, per source account and native currency.
    ///
    /// Covers deposits and transfers from accounts outside the set. Rows are
    /// sorted largest first.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn income_report(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AccountReport, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Deposit, TransactionType::Transfer])
            .destination_accounts(accounts)
            .exclude_source(accounts);
        let records = self.context.journals(&filter)?;
        self.opposing_report(&records, Direction::Source, SignMode::Positive, SortOrder::Descending)
    }

    fn opposing_report(
        &self,
        records: &[TransactionRecord],
        direction: Direction,
        sign: SignMode,
        order: SortOrder,
    ) -> Result<AccountReport, ReportError> {
        // native amounts only
        let native = self.context.policy().ignoring_preferences(false);
        let buckets = TransactionSummarizer::new(&native, self.context.converter()).aggregate_with(
            records,
            by_account(direction),
            sign,
            AggregateOptions {
                include_foreign: false,
            },
        )?;

        let accounts = buckets
            .sorted_by_float(order)
            .into_iter()
            .map(|bucket| {
                let (id, name) = bucket
                    .entity
                    .as_ref()
                    .map_or((0, String::new()), |entity| (entity.id, entity.name.clone()));
                AccountSumEntry {
                    id,
                    name,
                    sum: plain(&bucket.sum),
                    sum_float: bucket.sum_float(),
                    average: average(&bucket.sum, bucket.count, &bucket.currency),
                    count: bucket.count,
                    currency: (&bucket.currency).into(),
                }
            })
            .collect();

        Ok(AccountReport {
            accounts,
            sums: currency_totals(&buckets),
        })
    }

    /// Transfers in, out and their difference per (account, currency).
    ///
    /// The source account sends, the destination receives. A foreign leg
    /// repeats both movements in its own currency.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query fails or a record is
    /// malformed.
    pub fn transfers(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TransferEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Transfer])
            .either_accounts(accounts);
        let records = self.context.journals(&filter)?;

        let mut rows: IndexMap<(CurrencyId, AccountId), TransferEntry> = IndexMap::new();
        for record in &records {
            record.validate()?;
            let mut legs = vec![(record.native_currency(), record.amount.clone())];
            legs.extend(
                record
                    .foreign_leg()?
                    .filter(|(currency, _)| currency.id != record.currency_id),
            );

            for (currency, amount) in legs {
                let amount = amount.abs();
                let source = rows
                    .entry((currency.id, record.source_account_id))
                    .or_insert_with(|| {
                        TransferEntry::new(record.source_account_id, &record.source_account_name, &currency)
                    });
                source.outflow -= &amount;
                source.difference = &source.inflow + &source.outflow;

                let destination = rows
                    .entry((currency.id, record.destination_account_id))
                    .or_insert_with(|| {
                        TransferEntry::new(
                            record.destination_account_id,
                            &record.destination_account_name,
                            &currency,
                        )
                    });
                destination.inflow += &amount;
                destination.difference = &destination.inflow + &destination.outflow;
            }
        }

        debug!(rows = rows.len(), "Grouped transfers per account");
        Ok(rows
            .into_values()
            .map(|mut row| {
                row.finish();
                row
            })
            .collect())
    }

    /// Withdrawals touching `accounts`, per native currency, negative.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query fails or a record is
    /// malformed.
    pub fn list_expenses(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CurrencyJournals>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Withdrawal])
            .either_accounts(accounts);
        group_journals(&self.context.journals(&filter)?, SignMode::Negative)
    }

    /// Deposits touching `accounts`, per native currency, positive.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query fails or a record is
    /// malformed.
    pub fn list_income(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CurrencyJournals>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Deposit])
            .either_accounts(accounts);
        group_journals(&self.context.journals(&filter)?, SignMode::Positive)
    }

    /// Withdrawals from `accounts` per currency, under the request policy.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn sum_expenses(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Withdrawal])
            .source_accounts(accounts);
        let records = self.context.journals(&filter)?;
        Ok(self
            .context
            .summarizer()
            .group_by_currency_id(&records, SignMode::Negative, true)?
            .entries())
    }

    /// Deposits into `accounts` per currency, under the request policy.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn sum_income(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Deposit])
            .destination_accounts(accounts);
        let records = self.context.journals(&filter)?;
        Ok(self
            .context
            .summarizer()
            .group_by_currency_id(&records, SignMode::Positive, true)?
            .entries())
    }

    /// Withdrawals from `accounts` per (destination, currency).
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn sum_expenses_by_destination(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Withdrawal])
            .source_accounts(accounts);
        let records = self.context.journals(&filter)?;
        Ok(self
            .context
            .summarizer()
            .group_by_direction(&records, SignMode::Negative, Direction::Destination)?
            .entries())
    }

    /// Deposits into `accounts` per (source, currency).
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn sum_income_by_source(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Deposit])
            .destination_accounts(accounts);
        let records = self.context.journals(&filter)?;
        Ok(self
            .context
            .summarizer()
            .group_by_direction(&records, SignMode::Positive, Direction::Source)?
            .entries())
    }
}

/// Totals per currency over entity buckets, exact.
fn currency_totals(buckets: &BucketMap) -> Vec<SumEntry> {
    let mut totals = BucketMap::new();
    for bucket in buckets.iter() {
        totals.add(
            GroupSlot::currency(bucket.currency.id),
            &bucket.currency,
            &bucket.sum,
        );
    }
    totals
        .iter()
        .map(|total| {
            let mut entry = total.to_entry();
            // count journals, not rows
            entry.count = buckets
                .iter()
                .filter(|bucket| bucket.currency.id == total.currency.id)
                .map(|bucket| bucket.count)
                .sum();
            entry
        })
        .collect()
}

fn group_journals(records: &[TransactionRecord], sign: SignMode) -> Result<Vec<CurrencyJournals>, ReportError> {
    let mut grouped: IndexMap<CurrencyId, CurrencyJournals> = IndexMap::new();
    for record in records {
        record.validate()?;
        grouped
            .entry(record.currency_id)
            .or_insert_with(|| CurrencyJournals {
                currency: (&record.native_currency()).into(),
                transaction_journals: Vec::new(),
            })
            .transaction_journals
            .push(JournalLine::new(record, sign));
    }
    Ok(grouped.into_values().collect())
}
