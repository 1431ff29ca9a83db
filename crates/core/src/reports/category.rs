//! Category reports.

use chrono::NaiveDate;
use indexmap::IndexMap;
use tally_shared::types::{AccountId, CategoryId, CurrencyId};

use super::context::ReportContext;
use super::error::ReportError;
use super::query::JournalFilter;
use super::types::{CategoryJournals, CurrencyCategories, JournalLine};
use crate::policy::SignMode;
use crate::summary::{AggregateOptions, SumEntry, TransactionSummarizer, by_category, by_currency};
use crate::transaction::{TransactionRecord, TransactionType};

/// Label of the bucket holding uncategorised income.
pub const NO_CATEGORY: &str = "(no category)";

/// Category-centric reports.
#[derive(Clone, Copy)]
pub struct CategoryReports<'a> {
    context: &'a ReportContext<'a>,
}

impl<'a> CategoryReports<'a> {
    /// Creates the façade.
    #[must_use]
    pub const fn new(context: &'a ReportContext<'a>) -> Self {
        Self { context }
    }

    /// Categorised withdrawals per currency and category, negative.
    ///
    /// Withdrawals into one of `accounts` (e.g. paying off a liability) are
    /// left out.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query fails or a record is
    /// malformed.
    pub fn list_expenses(
        &self,
        accounts: &[AccountId],
        categories: &[CategoryId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CurrencyCategories>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Withdrawal])
            .either_accounts(accounts)
            .exclude_destination(accounts)
            .categories(categories);
        group_by_category(&self.context.journals(&filter)?, SignMode::Negative, false)
    }

    /// Deposits per currency and category, positive.
    ///
    /// Uncategorised deposits are kept under [`NO_CATEGORY`].
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query fails or a record is
    /// malformed.
    pub fn list_income(
        &self,
        accounts: &[AccountId],
        categories: &[CategoryId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CurrencyCategories>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Deposit])
            .either_accounts(accounts)
            .exclude_source(accounts)
            .categories(categories);
        group_by_category(&self.context.journals(&filter)?, SignMode::Positive, true)
    }

    /// Categorised transfers into `accounts` from elsewhere, positive.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query fails or a record is
    /// malformed.
    pub fn list_transferred_in(
        &self,
        accounts: &[AccountId],
        categories: &[CategoryId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CurrencyCategories>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Transfer])
            .destination_accounts(accounts)
            .exclude_source(accounts)
            .categories(categories);
        group_by_category(&self.context.journals(&filter)?, SignMode::Positive, false)
    }

    /// Categorised transfers out of `accounts` to elsewhere, negative.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query fails or a record is
    /// malformed.
    pub fn list_transferred_out(
        &self,
        accounts: &[AccountId],
        categories: &[CategoryId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CurrencyCategories>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Transfer])
            .source_accounts(accounts)
            .exclude_destination(accounts)
            .categories(categories);
        group_by_category(&self.context.journals(&filter)?, SignMode::Negative, false)
    }

    /// Withdrawals per (category, currency) under the request policy.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn sum_by_category(
        &self,
        accounts: &[AccountId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[TransactionType::Withdrawal])
            .either_accounts(accounts);
        let records = self.context.journals(&filter)?;
        Ok(self
            .context
            .summarizer()
            .aggregate(&records, by_category(), SignMode::Negative)?
            .entries())
    }

    /// Categorised withdrawals per currency, counting foreign legs.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn sum_expenses(
        &self,
        accounts: &[AccountId],
        categories: &[CategoryId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let records = self.categorised(TransactionType::Withdrawal, accounts, categories, start, end)?;
        Ok(self
            .context
            .summarizer()
            .group_by_currency_id(&records, SignMode::Negative, true)?
            .entries())
    }

    /// Categorised deposits per currency; foreign legs are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn sum_income(
        &self,
        accounts: &[AccountId],
        categories: &[CategoryId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let records = self.categorised(TransactionType::Deposit, accounts, categories, start, end)?;
        Ok(self
            .context
            .summarizer()
            .group_by_currency_id(&records, SignMode::Positive, false)?
            .entries())
    }

    /// Categorised transfers per native currency, positive.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if the ledger query or aggregation fails.
    pub fn sum_transfers(
        &self,
        accounts: &[AccountId],
        categories: &[CategoryId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let records = self.categorised(TransactionType::Transfer, accounts, categories, start, end)?;
        let native = self.context.policy().ignoring_preferences(false);
        Ok(TransactionSummarizer::new(&native, self.context.converter())
            .group_by_currency_id(&records, SignMode::Positive, false)?
            .entries())
    }

    /// Sums already collected records of one category per currency.
    ///
    /// Foreign legs are never counted. `convert_to_primary` replaces the
    /// request's preference.
    ///
    /// # Errors
    ///
    /// Returns `ReportError` if a record is malformed.
    pub fn sum_collected_by_category(
        &self,
        records: &[TransactionRecord],
        category: CategoryId,
        sign: SignMode,
        convert_to_primary: bool,
    ) -> Result<Vec<SumEntry>, ReportError> {
        let selected: Vec<TransactionRecord> = records
            .iter()
            .filter(|record| record.category_id == Some(category))
            .cloned()
            .collect();
        let policy = self.context.policy().ignoring_preferences(convert_to_primary);
        Ok(TransactionSummarizer::new(&policy, self.context.converter())
            .aggregate_with(
                &selected,
                by_currency(),
                sign,
                AggregateOptions {
                    include_foreign: false,
                },
            )?
            .entries())
    }

    /// Records of one type in `categories` (all categorised records when
    /// empty).
    fn categorised(
        &self,
        kind: TransactionType,
        accounts: &[AccountId],
        categories: &[CategoryId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TransactionRecord>, ReportError> {
        let filter = JournalFilter::new(start, end)
            .types(&[kind])
            .either_accounts(accounts)
            .categories(categories);
        let records = self.context.journals(&filter)?;
        Ok(records
            .into_iter()
            .filter(|record| record.category_id.is_some())
            .collect())
    }
}

/// Currency → category → journals, in order of first appearance.
fn group_by_category(
    records: &[TransactionRecord],
    sign: SignMode,
    keep_uncategorised: bool,
) -> Result<Vec<CurrencyCategories>, ReportError> {
    let mut grouped: IndexMap<CurrencyId, (CurrencyCategories, IndexMap<u64, CategoryJournals>)> =
        IndexMap::new();

    for record in records {
        record.validate()?;
        let (id, name) = match (record.category_id, record.category_name.as_deref()) {
            (Some(id), name) => (id.into_inner(), name.unwrap_or_default().to_string()),
            (None, _) if keep_uncategorised => (0, NO_CATEGORY.to_string()),
            (None, _) => continue,
        };

        let (_, categories) = grouped.entry(record.currency_id).or_insert_with(|| {
            (
                CurrencyCategories {
                    currency: (&record.native_currency()).into(),
                    categories: Vec::new(),
                },
                IndexMap::new(),
            )
        });
        categories
            .entry(id)
            .or_insert_with(|| CategoryJournals {
                id,
                name,
                transaction_journals: Vec::new(),
            })
            .transaction_journals
            .push(JournalLine::new(record, sign));
    }

    Ok(grouped
        .into_values()
        .map(|(mut currency, categories)| {
            currency.categories = categories.into_values().collect();
            currency
        })
        .collect())
}
