//! Chart data.

use chrono::NaiveDate;
use tally_shared::types::AccountId;
use tracing::debug;

use super::context::ReportContext;
use super::error::ReportError;
use super::query::JournalFilter;
use crate::series::{ChartDataset, Period, PeriodSeries};

/// Chart-shaped reports. The step follows the requested range.
#[derive(Clone, Copy)]
pub struct ChartReports<'a> {
    context: &'a ReportContext<'a>,
}

impl<'a> ChartReports<'a> {
    /// Creates the façade.
    #[must_use]
    pub const fn new(context: &'a ReportContext<'a>) -> Self {
        Self { context }
    }

    /// Earned and spent per currency and period for `accounts`.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query fails or a record is
    /// malformed.
    pub fn income_expense(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ChartDataset>, ReportError> {
        let period = Period::for_range(start, end);
        debug!(%start, %end, %period, "Building income/expense chart");

        let filter = JournalFilter::new(start, end).either_accounts(accounts);
        let records = self.context.journals(&filter)?;
        Ok(self
            .context
            .flow_builder()
            .income_and_expense(&records, accounts, start, end, period)?)
    }

    /// Balance of one account at the end of every period.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::AccountNotFound` for unknown accounts and
    /// `ReportError::Series` if a balance currency is unknown.
    pub fn account_balance(
        &self,
        account: AccountId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PeriodSeries>, ReportError> {
        let period = Period::for_range(start, end);
        debug!(%account, %start, %end, %period, "Building account balance chart");

        let snapshots = self.context.ledger().balances(account)?;
        Ok(self
            .context
            .balance_builder()
            .build(&snapshots, start, end, period)?
            .into_values()
            .collect())
    }
}
