//! Typed IDs for type-safe entity references.
//!
//! The ledger hands out plain integer ids and uses `0` to mean "none".
//! Typed wrappers stop a `CategoryId` from being passed where a `BudgetId`
//! is expected, and the `0` sentinel is turned into `Option::None` once,
//! while deserializing.

use serde::{Deserialize, Deserializer, Serialize};

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Creates an ID from its raw ledger value.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Maps the ledger's `0` sentinel to `None`.
            #[must_use]
            pub const fn from_sentinel(raw: u64) -> Option<Self> {
                if raw == 0 { None } else { Some(Self(raw)) }
            }

            /// Returns the raw ledger value.
            #[must_use]
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

typed_id!(CurrencyId, "Unique identifier for a transaction currency.");
typed_id!(AccountId, "Unique identifier for an asset, expense or revenue account.");
typed_id!(JournalId, "Unique identifier for a transaction journal.");
typed_id!(GroupId, "Unique identifier for a transaction group.");
typed_id!(CategoryId, "Unique identifier for a category.");
typed_id!(BudgetId, "Unique identifier for a budget.");
typed_id!(TagId, "Unique identifier for a tag.");

/// Deserializes an optional id where both `null` and `0` mean "none".
///
/// Use with `#[serde(default, deserialize_with = "sentinel_id")]`.
pub fn sentinel_id<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<u64>,
{
    let raw = Option::<u64>::deserialize(deserializer)?;
    Ok(raw.filter(|value| *value != 0).map(T::from))
}

macro_rules! from_raw {
    ($($name:ident),*) => {
        $(
            impl From<u64> for $name {
                fn from(raw: u64) -> Self {
                    Self(raw)
                }
            }
        )*
    };
}

from_raw!(CurrencyId, AccountId, JournalId, GroupId, CategoryId, BudgetId, TagId);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(default, deserialize_with = "sentinel_id")]
        category_id: Option<CategoryId>,
    }

    #[test]
    fn test_from_sentinel() {
        assert_eq!(CategoryId::from_sentinel(0), None);
        assert_eq!(CategoryId::from_sentinel(7), Some(CategoryId(7)));
    }

    #[test]
    fn test_display_and_parse() {
        let id = AccountId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(AccountId::from_str(" 42 ").unwrap(), id);
        assert!(AccountId::from_str("abc").is_err());
    }

    #[test]
    fn test_sentinel_deserialization() {
        let zero: Row = serde_json::from_str(r#"{"category_id": 0}"#).unwrap();
        assert_eq!(zero.category_id, None);

        let null: Row = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(null.category_id, None);

        let missing: Row = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.category_id, None);

        let set: Row = serde_json::from_str(r#"{"category_id": 3}"#).unwrap();
        assert_eq!(set.category_id, Some(CategoryId(3)));
    }

    #[test]
    fn test_transparent_serialization() {
        let json = serde_json::to_string(&CurrencyId::new(5)).unwrap();
        assert_eq!(json, "5");
    }
}
