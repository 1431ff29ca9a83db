//! Budget reports.

use chrono::NaiveDate;
use tally_shared::types::{AccountId, BudgetId, CurrencyId};

use super::context::ReportContext;
use super::error::ReportError;
use super::query::JournalFilter;
use crate::policy::SignMode;
use crate::summary::{AggregateOptions, SumEntry, TransactionSummarizer, by_budget, by_currency};
use crate::transaction::{TransactionRecord, TransactionType};

/// Budget-centric reports.
#[derive(Clone, Copy)]
pub struct BudgetReports<'a> {
    context: &'a ReportContext<'a>,
}

impl<'a> BudgetReports<'a> {
    /// Creates the façade.
    #[must_use]
    pub const fn new(context: &'a ReportContext<'a>) -> Self {
        Self { context }
    }

    /// Withdrawals per (budget, currency) under the request policy.
    ///
    /// Withdrawals without a budget are left out.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn sum_by_budget(
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
            .aggregate(&records, by_budget(), SignMode::Negative)?
            .entries())
    }

    /// Sums already collected expenses of one budget per currency.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if a record is malformed.
    pub fn sum_collected_by_budget(
        &self,
        records: &[TransactionRecord],
        budget: BudgetId,
        convert_to_primary: bool,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let selected: Vec<TransactionRecord> = records
            .iter()
            .filter(|record| record.budget_id == Some(budget))
            .cloned()
            .collect();
        self.sum_native_legs(&selected, convert_to_primary)
    }

    /// Sums already collected expenses inside a date range that touch
    /// `currency` on either leg.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if a record is malformed.
    pub fn sum_collected_expenses(
        &self,
        records: &[TransactionRecord],
        start: NaiveDate,
        end: NaiveDate,
        currency: CurrencyId,
        convert_to_primary: bool,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let selected: Vec<TransactionRecord> = records
            .iter()
            .filter(|record| (start..=end).contains(&record.as_of()))
            .filter(|record| {
                record.currency_id == currency || record.foreign_currency_id == Some(currency)
            })
            .cloned()
            .collect();
        self.sum_native_legs(&selected, convert_to_primary)
    }

    fn sum_native_legs(
        &self,
        records: &[TransactionRecord],
        convert_to_primary: bool,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let policy = self.context.policy().ignoring_preferences(convert_to_primary);
        Ok(TransactionSummarizer::new(&policy, self.context.converter())
            .aggregate_with(
                records,
                by_currency(),
                SignMode::Negative,
                AggregateOptions {
                    include_foreign: false,
                },
            )?
            .entries())
    }
}
