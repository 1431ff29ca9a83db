//! Ledger query contract.
//!
//! Reports never touch storage. They describe what they need with a
//! [`JournalFilter`] and receive flat, already-filtered records.

use chrono::NaiveDate;
use indexmap::IndexMap;
use tally_shared::types::{AccountId, CategoryId, TagId};

use super::error::ReportError;
use crate::series::BalanceSnapshot;
use crate::transaction::{TransactionRecord, TransactionType};

/// Which records a report wants.
///
/// Dates are inclusive calendar days. Empty account or category lists mean
/// "no restriction".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalFilter {
    /// First day.
    pub start: NaiveDate,
    /// Last day.
    pub end: NaiveDate,
    /// Allowed journal types; empty allows all.
    pub types: Vec<TransactionType>,
    /// Source must be one of these.
    pub source_accounts: Vec<AccountId>,
    /// Destination must be one of these.
    pub destination_accounts: Vec<AccountId>,
    /// Source or destination must be one of these.
    pub either_accounts: Vec<AccountId>,
    /// Source must not be one of these.
    pub exclude_source: Vec<AccountId>,
    /// Destination must not be one of these.
    pub exclude_destination: Vec<AccountId>,
    /// Category must be one of these.
    pub categories: Vec<CategoryId>,
    /// At least one tag must be one of these.
    pub tags: Vec<TagId>,
    /// Only records without tags.
    pub without_tags: bool,
}

impl JournalFilter {
    /// Filter on a date range only.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            types: Vec::new(),
            source_accounts: Vec::new(),
            destination_accounts: Vec::new(),
            either_accounts: Vec::new(),
            exclude_source: Vec::new(),
            exclude_destination: Vec::new(),
            categories: Vec::new(),
            tags: Vec::new(),
            without_tags: false,
        }
    }

    /// Restricts journal types.
    #[must_use]
    pub fn types(mut self, types: &[TransactionType]) -> Self {
        self.types = types.to_vec();
        self
    }

    /// Restricts source accounts.
    #[must_use]
    pub fn source_accounts(mut self, accounts: &[AccountId]) -> Self {
        self.source_accounts = accounts.to_vec();
        self
    }

    /// Restricts destination accounts.
    #[must_use]
    pub fn destination_accounts(mut self, accounts: &[AccountId]) -> Self {
        self.destination_accounts = accounts.to_vec();
        self
    }

    /// Requires either side to be one of `accounts`.
    #[must_use]
    pub fn either_accounts(mut self, accounts: &[AccountId]) -> Self {
        self.either_accounts = accounts.to_vec();
        self
    }

    /// Excludes source accounts.
    #[must_use]
    pub fn exclude_source(mut self, accounts: &[AccountId]) -> Self {
        self.exclude_source = accounts.to_vec();
        self
    }

    /// Excludes destination accounts.
    #[must_use]
    pub fn exclude_destination(mut self, accounts: &[AccountId]) -> Self {
        self.exclude_destination = accounts.to_vec();
        self
    }

    /// Restricts categories.
    #[must_use]
    pub fn categories(mut self, categories: &[CategoryId]) -> Self {
        self.categories = categories.to_vec();
        self
    }

    /// Restricts tags.
    #[must_use]
    pub fn tags(mut self, tags: &[TagId]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    /// Keeps untagged records only.
    #[must_use]
    pub fn without_tags(mut self) -> Self {
        self.without_tags = true;
        self
    }

    /// Whether a record passes this filter.
    #[must_use]
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        let date = record.as_of();
        if date < self.start || date > self.end {
            return false;
        }
        if !self.types.is_empty() && !self.types.contains(&record.transaction_type) {
            return false;
        }

        let source = record.source_account_id;
        let destination = record.destination_account_id;
        if !self.source_accounts.is_empty() && !self.source_accounts.contains(&source) {
            return false;
        }
        if !self.destination_accounts.is_empty() && !self.destination_accounts.contains(&destination) {
            return false;
        }
        if !self.either_accounts.is_empty()
            && !self.either_accounts.contains(&source)
            && !self.either_accounts.contains(&destination)
        {
            return false;
        }
        if self.exclude_source.contains(&source) || self.exclude_destination.contains(&destination) {
            return false;
        }

        if !self.categories.is_empty()
            && !record
                .category_id
                .is_some_and(|category| self.categories.contains(&category))
        {
            return false;
        }
        if self.without_tags && !record.tags.is_empty() {
            return false;
        }
        self.tags.is_empty() || record.tags.iter().any(|tag| self.tags.contains(&tag.id))
    }
}

/// Source of transaction records and account balances.
pub trait TransactionQuery: Send + Sync {
    /// Records matching `filter`, in ledger order.
    fn journals(&self, filter: &JournalFilter) -> Result<Vec<TransactionRecord>, ReportError>;

    /// Balance history of one account.
    fn balances(&self, account: AccountId) -> Result<Vec<BalanceSnapshot>, ReportError>;
}

/// Ledger held in memory, e.g. loaded from a JSON export.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    records: Vec<TransactionRecord>,
    balances: IndexMap<AccountId, Vec<BalanceSnapshot>>,
}

impl InMemoryLedger {
    /// Creates a ledger from records.
    #[must_use]
    pub fn new(records: Vec<TransactionRecord>) -> Self {
        Self {
            records,
            balances: IndexMap::new(),
        }
    }

    /// Sets an account's balance history.
    #[must_use]
    pub fn with_balances(mut self, account: AccountId, snapshots: Vec<BalanceSnapshot>) -> Self {
        self.balances.insert(account, snapshots);
        self
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TransactionQuery for InMemoryLedger {
    fn journals(&self, filter: &JournalFilter) -> Result<Vec<TransactionRecord>, ReportError> {
        Ok(self
            .records
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    fn balances(&self, account: AccountId) -> Result<Vec<BalanceSnapshot>, ReportError> {
        self.balances
            .get(&account)
            .cloned()
            .ok_or(ReportError::AccountNotFound(account))
    }
}
