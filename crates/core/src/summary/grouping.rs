//! Grouping key functions.
//!
//! A grouping function maps a record and the currency one of its legs was
//! attributed to onto zero or more bucket slots. Returning no slot drops
//! the contribution (records without a category in a category grouping).

use serde::{Deserialize, Serialize};

use super::bucket::GroupSlot;
use crate::currency::CurrencyInfo;
use crate::series::Period;
use crate::transaction::TransactionRecord;

/// Side of a record used by [`by_account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Source account.
    Source,
    /// Destination account.
    Destination,
}

impl Direction {
    /// Account id and name on this side of the record.
    #[must_use]
    pub fn account<'r>(self, record: &'r TransactionRecord) -> (u64, &'r str) {
        match self {
            Self::Source => (
                record.source_account_id.into_inner(),
                &record.source_account_name,
            ),
            Self::Destination => (
                record.destination_account_id.into_inner(),
                &record.destination_account_name,
            ),
        }
    }
}

/// One bucket per currency.
pub fn by_currency() -> impl Fn(&TransactionRecord, &CurrencyInfo) -> Vec<GroupSlot> {
    |_, currency| vec![GroupSlot::currency(currency.id)]
}

/// One bucket per (account on the given side, currency).
pub fn by_account(direction: Direction) -> impl Fn(&TransactionRecord, &CurrencyInfo) -> Vec<GroupSlot> {
    move |record, currency| {
        let (id, name) = direction.account(record);
        vec![GroupSlot::entity(currency.id, id, name)]
    }
}

/// One bucket per (category, currency); uncategorised records are skipped.
pub fn by_category() -> impl Fn(&TransactionRecord, &CurrencyInfo) -> Vec<GroupSlot> {
    |record, currency| {
        record
            .category_id
            .map(|id| {
                let name = record.category_name.as_deref().unwrap_or_default();
                GroupSlot::entity(currency.id, id.into_inner(), name)
            })
            .into_iter()
            .collect()
    }
}

/// One bucket per (budget, currency); records without a budget are skipped.
pub fn by_budget() -> impl Fn(&TransactionRecord, &CurrencyInfo) -> Vec<GroupSlot> {
    |record, currency| {
        record
            .budget_id
            .map(|id| {
                let name = record.budget_name.as_deref().unwrap_or_default();
                GroupSlot::entity(currency.id, id.into_inner(), name)
            })
            .into_iter()
            .collect()
    }
}

/// One bucket per (tag, currency); a record counts once for every tag.
pub fn by_tag() -> impl Fn(&TransactionRecord, &CurrencyInfo) -> Vec<GroupSlot> {
    |record, currency| {
        record
            .tags
            .iter()
            .map(|tag| GroupSlot::entity(currency.id, tag.id.into_inner(), &tag.name))
            .collect()
    }
}

/// One bucket per (currency, period of the record's date).
pub fn by_period(period: Period) -> impl Fn(&TransactionRecord, &CurrencyInfo) -> Vec<GroupSlot> {
    move |record, currency| vec![GroupSlot::period(currency.id, period.label(record.as_of()))]
}
