//! Transaction record types.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{
    AccountId, BudgetId, CategoryId, CurrencyId, GroupId, JournalId, TagId, exact, sentinel_id,
    serialize_plain, serialize_plain_option,
};

use super::error::RecordError;
use crate::currency::CurrencyInfo;

/// Journal type as seen by reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money leaving an asset account.
    #[serde(alias = "Withdrawal")]
    Withdrawal,
    /// Money arriving in an asset account.
    #[serde(alias = "Deposit")]
    Deposit,
    /// Money moving between two own accounts.
    #[serde(alias = "Transfer")]
    Transfer,
    /// Balance correction.
    #[serde(alias = "Reconciliation")]
    Reconciliation,
    /// Initial balance of an account.
    #[serde(alias = "Opening balance")]
    OpeningBalance,
}

impl TransactionType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Withdrawal => "withdrawal",
            Self::Deposit => "deposit",
            Self::Transfer => "transfer",
            Self::Reconciliation => "reconciliation",
            Self::OpeningBalance => "opening_balance",
        }
    }

    /// Transfer-like types move money between accounts the user owns.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Transfer | Self::Reconciliation | Self::OpeningBalance)
    }
}

/// Tag attached to a journal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRef {
    /// Tag id.
    pub id: TagId,
    /// Tag name.
    pub name: String,
}

/// One leg of a journal, flattened.
///
/// Field names follow the ledger export. Ids of `0` for category, budget
/// and foreign currency arrive as `None`. Amounts keep every digit the
/// ledger stores, beyond what `Decimal` can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Journal id (not unique per record).
    #[serde(rename = "transaction_journal_id")]
    pub journal_id: JournalId,
    /// Group id.
    #[serde(rename = "transaction_group_id")]
    pub group_id: GroupId,
    /// Effective date of the journal.
    pub date: DateTime<Utc>,
    /// Native amount, non-negative by convention.
    #[serde(serialize_with = "serialize_plain")]
    pub amount: BigDecimal,

    /// Native currency id.
    pub currency_id: CurrencyId,
    /// Native currency code.
    pub currency_code: String,
    /// Native currency name.
    #[serde(default)]
    pub currency_name: String,
    /// Native currency symbol.
    #[serde(default)]
    pub currency_symbol: String,
    /// Native currency decimal places.
    pub currency_decimal_places: u32,

    /// Second currency leg amount.
    #[serde(default, serialize_with = "serialize_plain_option")]
    pub foreign_amount: Option<BigDecimal>,
    /// Second currency leg currency.
    #[serde(default, deserialize_with = "sentinel_id")]
    pub foreign_currency_id: Option<CurrencyId>,
    /// Foreign currency code.
    #[serde(default)]
    pub foreign_currency_code: Option<String>,
    /// Foreign currency name.
    #[serde(default)]
    pub foreign_currency_name: Option<String>,
    /// Foreign currency symbol.
    #[serde(default)]
    pub foreign_currency_symbol: Option<String>,
    /// Foreign currency decimal places.
    #[serde(default)]
    pub foreign_currency_decimal_places: Option<u32>,

    /// Amount in the request's primary currency, when the ledger computed it.
    #[serde(default, serialize_with = "serialize_plain_option")]
    pub pc_amount: Option<BigDecimal>,

    /// Journal type.
    #[serde(rename = "transaction_type_type")]
    pub transaction_type: TransactionType,

    /// Source account.
    pub source_account_id: AccountId,
    /// Source account name.
    #[serde(default)]
    pub source_account_name: String,
    /// Destination account.
    pub destination_account_id: AccountId,
    /// Destination account name.
    #[serde(default)]
    pub destination_account_name: String,

    /// Category, if any.
    #[serde(default, deserialize_with = "sentinel_id")]
    pub category_id: Option<CategoryId>,
    /// Category name.
    #[serde(default)]
    pub category_name: Option<String>,
    /// Budget, if any.
    #[serde(default, deserialize_with = "sentinel_id")]
    pub budget_id: Option<BudgetId>,
    /// Budget name.
    #[serde(default)]
    pub budget_name: Option<String>,
    /// Tags.
    #[serde(default)]
    pub tags: Vec<TagRef>,
    /// Description.
    #[serde(default)]
    pub description: String,
}

impl TransactionRecord {
    /// Creates a record with only the mandatory fields set.
    ///
    /// Accounts default to id 0 with empty names; use the `with_*` methods
    /// to fill in the rest.
    #[must_use]
    pub fn new(
        journal_id: u64,
        date: DateTime<Utc>,
        amount: Decimal,
        currency: &CurrencyInfo,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            journal_id: JournalId::new(journal_id),
            group_id: GroupId::new(journal_id),
            date,
            amount: exact(amount),
            currency_id: currency.id,
            currency_code: currency.code.clone(),
            currency_name: currency.name.clone(),
            currency_symbol: currency.symbol.clone(),
            currency_decimal_places: currency.decimal_places,
            foreign_amount: None,
            foreign_currency_id: None,
            foreign_currency_code: None,
            foreign_currency_name: None,
            foreign_currency_symbol: None,
            foreign_currency_decimal_places: None,
            pc_amount: None,
            transaction_type,
            source_account_id: AccountId::new(0),
            source_account_name: String::new(),
            destination_account_id: AccountId::new(0),
            destination_account_name: String::new(),
            category_id: None,
            category_name: None,
            budget_id: None,
            budget_name: None,
            tags: Vec::new(),
            description: String::new(),
        }
    }

    /// Sets the foreign leg.
    #[must_use]
    pub fn with_foreign(mut self, amount: Decimal, currency: &CurrencyInfo) -> Self {
        self.foreign_amount = Some(exact(amount));
        self.foreign_currency_id = Some(currency.id);
        self.foreign_currency_code = Some(currency.code.clone());
        self.foreign_currency_name = Some(currency.name.clone());
        self.foreign_currency_symbol = Some(currency.symbol.clone());
        self.foreign_currency_decimal_places = Some(currency.decimal_places);
        self
    }

    /// Sets the precomputed primary currency amount.
    #[must_use]
    pub fn with_pc_amount(mut self, amount: Decimal) -> Self {
        self.pc_amount = Some(exact(amount));
        self
    }

    /// Sets source and destination accounts.
    #[must_use]
    pub fn with_accounts(mut self, source: (u64, &str), destination: (u64, &str)) -> Self {
        self.source_account_id = AccountId::new(source.0);
        self.source_account_name = source.1.to_string();
        self.destination_account_id = AccountId::new(destination.0);
        self.destination_account_name = destination.1.to_string();
        self
    }

    /// Sets the category; id `0` clears it.
    #[must_use]
    pub fn with_category(mut self, id: u64, name: &str) -> Self {
        self.category_id = CategoryId::from_sentinel(id);
        self.category_name = self.category_id.map(|_| name.to_string());
        self
    }

    /// Sets the budget; id `0` clears it.
    #[must_use]
    pub fn with_budget(mut self, id: u64, name: &str) -> Self {
        self.budget_id = BudgetId::from_sentinel(id);
        self.budget_name = self.budget_id.map(|_| name.to_string());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, id: u64, name: &str) -> Self {
        self.tags.push(TagRef {
            id: TagId::new(id),
            name: name.to_string(),
        });
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Date used for rate lookups.
    #[must_use]
    pub fn as_of(&self) -> NaiveDate {
        self.date.date_naive()
    }

    /// Native currency metadata.
    #[must_use]
    pub fn native_currency(&self) -> CurrencyInfo {
        CurrencyInfo {
            id: self.currency_id,
            code: self.currency_code.clone(),
            name: self.currency_name.clone(),
            symbol: self.currency_symbol.clone(),
            decimal_places: self.currency_decimal_places,
        }
    }

    /// Foreign currency and amount, if this record carries a second leg.
    ///
    /// A foreign currency without an amount is not a leg.
    pub fn foreign_leg(&self) -> Result<Option<(CurrencyInfo, BigDecimal)>, RecordError> {
        let Some(amount) = self.foreign_amount.clone() else {
            return Ok(None);
        };
        let currency_id = self
            .foreign_currency_id
            .ok_or(RecordError::ForeignAmountWithoutCurrency(self.journal_id))?;

        let (Some(code), Some(decimal_places)) = (
            self.foreign_currency_code.as_ref(),
            self.foreign_currency_decimal_places,
        ) else {
            return Err(RecordError::IncompleteForeignCurrency {
                journal_id: self.journal_id,
                currency_id,
            });
        };

        let currency = CurrencyInfo {
            id: currency_id,
            code: code.clone(),
            name: self.foreign_currency_name.clone().unwrap_or_default(),
            symbol: self.foreign_currency_symbol.clone().unwrap_or_default(),
            decimal_places,
        };
        Ok(Some((currency, amount)))
    }

    /// Checks the record contract.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.currency_code.trim().is_empty() {
            return Err(RecordError::MissingCurrency(self.journal_id));
        }
        self.foreign_leg().map(|_| ())
    }
}
