//! Currency directory: id/code to metadata lookups.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tally_shared::types::CurrencyId;

use super::error::CurrencyError;

/// Currency metadata as carried on buckets and series.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyInfo {
    /// Ledger id.
    pub id: CurrencyId,
    /// ISO 4217 code (e.g. "EUR").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Display symbol.
    pub symbol: String,
    /// Number of decimal places amounts are presented with.
    pub decimal_places: u32,
}

impl CurrencyInfo {
    /// Creates currency metadata.
    #[must_use]
    pub fn new(id: u64, code: &str, name: &str, symbol: &str, decimal_places: u32) -> Self {
        Self {
            id: CurrencyId::new(id),
            code: code.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimal_places,
        }
    }
}

/// Read-only currency lookup.
///
/// Must succeed for every currency that legitimately appears on a
/// transaction record; a miss is a data-integrity problem upstream.
pub trait CurrencyDirectory: Send + Sync {
    /// Finds a currency by id.
    fn find_by_id(&self, id: CurrencyId) -> Option<CurrencyInfo>;

    /// Finds a currency by ISO code (case-insensitive).
    fn find_by_code(&self, code: &str) -> Option<CurrencyInfo>;

    /// Resolves a currency by id.
    fn resolve(&self, id: CurrencyId) -> Result<CurrencyInfo, CurrencyError> {
        self.find_by_id(id).ok_or(CurrencyError::UnknownId(id))
    }

    /// Resolves a currency by code.
    fn resolve_code(&self, code: &str) -> Result<CurrencyInfo, CurrencyError> {
        self.find_by_code(code)
            .ok_or_else(|| CurrencyError::UnknownCode(code.to_string()))
    }
}

/// Directory backed by a fixed list of currencies.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCurrencyDirectory {
    currencies: IndexMap<CurrencyId, CurrencyInfo>,
}

impl InMemoryCurrencyDirectory {
    /// Builds a directory from the given currencies.
    #[must_use]
    pub fn new(currencies: impl IntoIterator<Item = CurrencyInfo>) -> Self {
        Self {
            currencies: currencies.into_iter().map(|c| (c.id, c)).collect(),
        }
    }

    /// Number of known currencies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    /// Returns true if the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }
}

impl CurrencyDirectory for InMemoryCurrencyDirectory {
    fn find_by_id(&self, id: CurrencyId) -> Option<CurrencyInfo> {
        self.currencies.get(&id).cloned()
    }

    fn find_by_code(&self, code: &str) -> Option<CurrencyInfo> {
        self.currencies
            .values()
            .find(|c| c.code.eq_ignore_ascii_case(code))
            .cloned()
    }
}
