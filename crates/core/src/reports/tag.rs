//! Tag reports.

use chrono::NaiveDate;
use tally_shared::types::{AccountId, TagId};

use super::context::ReportContext;
use super::error::ReportError;
use super::query::JournalFilter;
use super::types::DifferenceEntry;
use crate::policy::SignMode;
use crate::summary::{AggregateOptions, SumEntry, TransactionSummarizer, by_currency, by_tag};
use crate::transaction::TransactionType;

/// Tag-centric reports.
#[derive(Clone, Copy)]
pub struct TagReports<'a> {
    context: &'a ReportContext<'a>,
}

impl<'a> TagReports<'a> {
    /// Creates the façade.
    #[must_use]
    pub const fn new(context: &'a ReportContext<'a>) -> Self {
        Self { context }
    }

    /// Withdrawals per (tag, currency) under the request policy.
    ///
    /// A journal with several tags counts once for each.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn sum_expenses_by_tag(
        &self,
        accounts: &[AccountId],
        tags: &[TagId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Withdrawal])
            .source_accounts(accounts)
            .tags(tags);
        let records = self.context.journals(&filter)?;
        Ok(self
            .context
            .summarizer()
            .aggregate(&records, by_tag(), SignMode::Negative)?
            .entries())
    }

    /// Deposits into `accounts` per (tag, currency).
    ///
    /// Amounts stay in their own currencies: the native leg and the foreign
    /// leg each count under their currency.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn income_by_tag(
        &self,
        accounts: &[AccountId],
        tags: &[TagId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DifferenceEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Deposit])
            .destination_accounts(accounts)
            .tags(tags);
        let records = self.context.journals(&filter)?;
        let native = self.context.policy().ignoring_preferences(false);
        let buckets = TransactionSummarizer::new(&native, self.context.converter()).aggregate(
            &records,
            by_tag(),
            SignMode::Positive,
        )?;
        Ok(buckets.entries().into_iter().map(DifferenceEntry::from).collect())
    }

    /// Untagged deposits into `accounts` per currency, under the request
    /// policy.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn income_without_tag(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DifferenceEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Deposit])
            .destination_accounts(accounts)
            .without_tags();
        let records = self.context.journals(&filter)?;
        let buckets = self.context.summarizer().aggregate_with(
            &records,
            by_currency(),
            SignMode::Positive,
            AggregateOptions {
                include_foreign: false,
            },
        )?;
        Ok(buckets.entries().into_iter().map(DifferenceEntry::from).collect())
    }
}
