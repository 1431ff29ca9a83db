//! Report data types.

use chrono::{DateTime, Utc};
use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;
use tally_shared::types::{
    AccountId, CurrencyId, GroupId, JournalId, display_float, plain, serialize_plain,
};

use crate::currency::{CurrencyInfo, round_for_currency};
use crate::policy::SignMode;
use crate::summary::SumEntry;
use crate::transaction::{TagRef, TransactionRecord};

/// Currency fields as flattened into report rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyFields {
    /// Currency id.
    pub currency_id: CurrencyId,
    /// Currency name.
    pub currency_name: String,
    /// Currency symbol.
    pub currency_symbol: String,
    /// Currency code.
    pub currency_code: String,
    /// Currency decimal places.
    pub currency_decimal_places: u32,
}

impl From<&CurrencyInfo> for CurrencyFields {
    fn from(currency: &CurrencyInfo) -> Self {
        Self {
            currency_id: currency.id,
            currency_name: currency.name.clone(),
            currency_symbol: currency.symbol.clone(),
            currency_code: currency.code.clone(),
            currency_decimal_places: currency.decimal_places,
        }
    }
}

/// Sums per opposing account with totals per currency.
#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    /// One row per (account, currency), sorted by float sum.
    pub accounts: Vec<AccountSumEntry>,
    /// Totals per currency.
    pub sums: Vec<SumEntry>,
}

/// One (account, currency) row of an [`AccountReport`].
#[derive(Debug, Clone, Serialize)]
pub struct AccountSumEntry {
    /// Account id.
    pub id: u64,
    /// Account name.
    pub name: String,
    /// Exact sum.
    pub sum: String,
    /// Rounded sum as float.
    pub sum_float: f64,
    /// Rounded mean, only when more than one journal contributed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<String>,
    /// Number of journals.
    pub count: usize,
    /// Currency.
    #[serde(flatten)]
    pub currency: CurrencyFields,
}

/// Money moved in and out of one account by transfers, in one currency.
#[derive(Debug, Clone, Serialize)]
pub struct TransferEntry {
    /// Account id.
    pub id: AccountId,
    /// Account name.
    pub name: String,
    /// Received, positive.
    #[serde(rename = "in", serialize_with = "serialize_plain")]
    pub inflow: BigDecimal,
    /// `inflow` as float.
    pub in_float: f64,
    /// Sent, negative.
    #[serde(rename = "out", serialize_with = "serialize_plain")]
    pub outflow: BigDecimal,
    /// `outflow` as float.
    pub out_float: f64,
    /// `inflow + outflow`.
    #[serde(serialize_with = "serialize_plain")]
    pub difference: BigDecimal,
    /// `difference` as float.
    pub difference_float: f64,
    /// Currency.
    #[serde(flatten)]
    pub currency: CurrencyFields,
}

impl TransferEntry {
    pub(crate) fn new(id: AccountId, name: &str, currency: &CurrencyInfo) -> Self {
        Self {
            id,
            name: name.to_string(),
            inflow: BigDecimal::zero(),
            in_float: 0.0,
            outflow: BigDecimal::zero(),
            out_float: 0.0,
            difference: BigDecimal::zero(),
            difference_float: 0.0,
            currency: currency.into(),
        }
    }

    /// Fills in the display floats.
    pub(crate) fn finish(&mut self) {
        self.in_float = display_float(&self.inflow);
        self.out_float = display_float(&self.outflow);
        self.difference_float = display_float(&self.difference);
    }
}

/// A signed total per currency, optionally per entity.
#[derive(Debug, Clone, Serialize)]
pub struct DifferenceEntry {
    /// Entity id (tag), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Entity name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Exact total.
    pub difference: String,
    /// Rounded total as float.
    pub difference_float: f64,
    /// Currency.
    #[serde(flatten)]
    pub currency: CurrencyFields,
}

impl From<SumEntry> for DifferenceEntry {
    fn from(entry: SumEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
            difference: entry.sum,
            difference_float: entry.sum_float,
            currency: CurrencyFields {
                currency_id: entry.currency_id,
                currency_name: entry.currency_name,
                currency_symbol: entry.currency_symbol,
                currency_code: entry.currency_code,
                currency_decimal_places: entry.currency_decimal_places,
            },
        }
    }
}

/// A journal as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct JournalLine {
    /// Journal id.
    pub transaction_journal_id: JournalId,
    /// Group id.
    pub transaction_group_id: GroupId,
    /// Date.
    pub date: DateTime<Utc>,
    /// Native amount with the listing's sign.
    #[serde(serialize_with = "serialize_plain")]
    pub amount: BigDecimal,
    /// Description.
    pub description: String,
    /// Source account id.
    pub source_account_id: AccountId,
    /// Source account name.
    pub source_account_name: String,
    /// Destination account id.
    pub destination_account_id: AccountId,
    /// Destination account name.
    pub destination_account_name: String,
    /// Category name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    /// Budget name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_name: Option<String>,
    /// Tags.
    pub tags: Vec<TagRef>,
}

impl JournalLine {
    /// Line for `record` with its amount signed by `sign`.
    #[must_use]
    pub fn new(record: &TransactionRecord, sign: SignMode) -> Self {
        Self {
            transaction_journal_id: record.journal_id,
            transaction_group_id: record.group_id,
            date: record.date,
            amount: sign.apply(&record.amount),
            description: record.description.clone(),
            source_account_id: record.source_account_id,
            source_account_name: record.source_account_name.clone(),
            destination_account_id: record.destination_account_id,
            destination_account_name: record.destination_account_name.clone(),
            category_name: record.category_name.clone(),
            budget_name: record.budget_name.clone(),
            tags: record.tags.clone(),
        }
    }
}

/// Journals of one currency.
#[derive(Debug, Clone, Serialize)]
pub struct CurrencyJournals {
    /// Currency.
    #[serde(flatten)]
    pub currency: CurrencyFields,
    /// Journals in ledger order.
    pub transaction_journals: Vec<JournalLine>,
}

/// Journals of one category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryJournals {
    /// Category id; `0` for uncategorised journals.
    pub id: u64,
    /// Category name.
    pub name: String,
    /// Journals in ledger order.
    pub transaction_journals: Vec<JournalLine>,
}

/// Journals of one currency, per category.
#[derive(Debug, Clone, Serialize)]
pub struct CurrencyCategories {
    /// Currency.
    #[serde(flatten)]
    pub currency: CurrencyFields,
    /// Categories in order of first appearance.
    pub categories: Vec<CategoryJournals>,
}

/// Mean of `sum` over `count`, rounded for `currency`.
pub(crate) fn average(sum: &BigDecimal, count: usize, currency: &CurrencyInfo) -> Option<String> {
    (count > 1).then(|| {
        let mean = sum.clone() / BigDecimal::from(BigInt::from(count));
        plain(&round_for_currency(&mean, currency))
    })
}
