//! Currency buckets: keyed decimal accumulators.

use std::fmt;

use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tally_shared::types::{CurrencyId, display_float, plain};

use crate::currency::{CurrencyInfo, round_for_currency};

/// Key of a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BucketKey {
    /// Currency only.
    Currency(CurrencyId),
    /// Currency and period label.
    Period {
        /// Currency.
        currency: CurrencyId,
        /// Period label.
        period: String,
    },
    /// Currency and an entity (account, category, budget, tag).
    Entity {
        /// Raw entity id.
        entity: u64,
        /// Currency.
        currency: CurrencyId,
    },
}

impl BucketKey {
    /// Currency part of the key.
    #[must_use]
    pub const fn currency(&self) -> CurrencyId {
        match self {
            Self::Currency(currency)
            | Self::Period { currency, .. }
            | Self::Entity { currency, .. } => *currency,
        }
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Currency(currency) => write!(f, "{currency}"),
            Self::Period { currency, period } => write!(f, "{currency}-{period}"),
            Self::Entity { entity, currency } => write!(f, "{entity}-{currency}"),
        }
    }
}

/// Entity a bucket belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Raw entity id.
    pub id: u64,
    /// Display name.
    pub name: String,
}

/// Where one contribution goes, as decided by a grouping function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSlot {
    /// Bucket key.
    pub key: BucketKey,
    /// Entity captured on the bucket when it is created.
    pub entity: Option<EntityRef>,
}

impl GroupSlot {
    /// Slot keyed by currency only.
    #[must_use]
    pub const fn currency(currency: CurrencyId) -> Self {
        Self {
            key: BucketKey::Currency(currency),
            entity: None,
        }
    }

    /// Slot keyed by currency and period label.
    #[must_use]
    pub const fn period(currency: CurrencyId, period: String) -> Self {
        Self {
            key: BucketKey::Period { currency, period },
            entity: None,
        }
    }

    /// Slot keyed by currency and entity.
    #[must_use]
    pub fn entity(currency: CurrencyId, id: u64, name: &str) -> Self {
        Self {
            key: BucketKey::Entity {
                entity: id,
                currency,
            },
            entity: Some(EntityRef {
                id,
                name: name.to_string(),
            }),
        }
    }
}

/// Exact decimal accumulator for one key.
///
/// The sum is arbitrary precision: adding never rounds and never overflows.
///
/// Currency metadata and entity are captured on first insertion and never
/// change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyBucket {
    /// Bucket key.
    pub key: BucketKey,
    /// Currency of the sum.
    pub currency: CurrencyInfo,
    /// Entity, for entity-keyed buckets.
    pub entity: Option<EntityRef>,
    /// Exact, unrounded sum.
    pub sum: BigDecimal,
    /// Number of contributions.
    pub count: usize,
}

impl CurrencyBucket {
    fn new(slot: GroupSlot, currency: &CurrencyInfo) -> Self {
        Self {
            key: slot.key,
            currency: currency.clone(),
            entity: slot.entity,
            sum: BigDecimal::zero(),
            count: 0,
        }
    }

    /// Adds a signed contribution.
    pub fn add(&mut self, amount: &BigDecimal) {
        self.sum += amount;
        self.count += 1;
    }

    /// Sum rounded to the currency's decimal places.
    #[must_use]
    pub fn rounded_sum(&self) -> BigDecimal {
        round_for_currency(&self.sum, &self.currency)
    }

    /// Display-only float, derived once from the rounded sum.
    #[must_use]
    pub fn sum_float(&self) -> f64 {
        display_float(&self.rounded_sum())
    }

    /// Output shape of this bucket.
    #[must_use]
    pub fn to_entry(&self) -> SumEntry {
        let period = match &self.key {
            BucketKey::Period { period, .. } => Some(period.clone()),
            _ => None,
        };
        SumEntry {
            id: self.entity.as_ref().map(|e| e.id),
            name: self.entity.as_ref().map(|e| e.name.clone()),
            period,
            sum: plain(&self.sum),
            sum_float: self.sum_float(),
            count: self.count,
            currency_id: self.currency.id,
            currency_name: self.currency.name.clone(),
            currency_symbol: self.currency.symbol.clone(),
            currency_code: self.currency.code.clone(),
            currency_decimal_places: self.currency.decimal_places,
        }
    }
}

/// Emitted sum: exact decimal string plus a lossy display float.
#[derive(Debug, Clone, Serialize)]
pub struct SumEntry {
    /// Entity id, for entity-keyed buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Entity name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Period label, for period-keyed buckets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    /// Exact sum.
    pub sum: String,
    /// Rounded sum as float; display and sorting only.
    pub sum_float: f64,
    /// Number of contributions.
    pub count: usize,
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

/// Sort direction for [`BucketMap::sorted_by_float`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// Insertion-ordered buckets produced by one aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketMap {
    buckets: IndexMap<BucketKey, CurrencyBucket>,
}

impl BucketMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the slot's bucket, creating it on first use.
    pub fn add(&mut self, slot: GroupSlot, currency: &CurrencyInfo, amount: &BigDecimal) {
        let key = slot.key.clone();
        self.buckets
            .entry(key)
            .or_insert_with(|| CurrencyBucket::new(slot, currency))
            .add(amount);
    }

    /// Looks up a bucket.
    #[must_use]
    pub fn get(&self, key: &BucketKey) -> Option<&CurrencyBucket> {
        self.buckets.get(key)
    }

    /// Looks up a currency-only bucket.
    #[must_use]
    pub fn get_currency(&self, currency: CurrencyId) -> Option<&CurrencyBucket> {
        self.buckets.get(&BucketKey::Currency(currency))
    }

    /// Number of buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if nothing was aggregated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Buckets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CurrencyBucket> {
        self.buckets.values()
    }

    /// Buckets sorted by display float; ties keep insertion order.
    #[must_use]
    pub fn sorted_by_float(&self, order: SortOrder) -> Vec<&CurrencyBucket> {
        let mut sorted: Vec<&CurrencyBucket> = self.buckets.values().collect();
        sorted.sort_by(|a, b| match order {
            SortOrder::Ascending => a.sum_float().total_cmp(&b.sum_float()),
            SortOrder::Descending => b.sum_float().total_cmp(&a.sum_float()),
        });
        sorted
    }

    /// Output entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<SumEntry> {
        self.iter().map(CurrencyBucket::to_entry).collect()
    }

    /// Output entries keyed by the bucket key's string form.
    #[must_use]
    pub fn to_output(&self) -> IndexMap<String, SumEntry> {
        self.buckets
            .iter()
            .map(|(key, bucket)| (key.to_string(), bucket.to_entry()))
            .collect()
    }
}

impl IntoIterator for BucketMap {
    type Item = CurrencyBucket;
    type IntoIter = indexmap::map::IntoValues<BucketKey, CurrencyBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.into_values()
    }
}
