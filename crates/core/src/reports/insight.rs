//! Insight totals: what went out, came in and moved around.

use chrono::NaiveDate;
use tally_shared::types::AccountId;

use super::context::ReportContext;
use super::error::ReportError;
use super::query::JournalFilter;
use super::types::DifferenceEntry;
use crate::policy::SignMode;
use crate::summary::{AggregateOptions, by_currency};
use crate::transaction::{TransactionRecord, TransactionType};

/// Period totals per currency.
///
/// Only the main leg of each journal counts; when not converting, foreign
/// amounts are ignored.
#[derive(Clone, Copy)]
pub struct InsightReports<'a> {
    context: &'a ReportContext<'a>,
}

impl<'a> InsightReports<'a> {
    /// Creates the façade.
    #[must_use]
    pub const fn new(context: &'a ReportContext<'a>) -> Self {
        Self { context }
    }

    /// Withdrawals from `accounts`, negative.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn expense_total(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DifferenceEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Withdrawal])
            .source_accounts(accounts);
        self.total(&self.context.journals(&filter)?, SignMode::Negative)
    }

    /// Deposits into `accounts`, positive.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn income_total(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DifferenceEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Deposit])
            .destination_accounts(accounts);
        self.total(&self.context.journals(&filter)?, SignMode::Positive)
    }

    /// Transfers touching `accounts`, positive.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn transfer_total(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DifferenceEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Transfer])
            .either_accounts(accounts);
        self.total(&self.context.journals(&filter)?, SignMode::Positive)
    }

    fn total(&self, records: &[TransactionRecord], sign: SignMode) -> Result<Vec<DifferenceEntry>, ReportError> {
        let buckets = self.context.summarizer().aggregate_with(
            records,
            by_currency(),
            sign,
            AggregateOptions {
                include_foreign: false,
            },
        )?;
        Ok(buckets.entries().into_iter().map(DifferenceEntry::from).collect())
    }
}
