//! Sign modes.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{negative, positive};

/// Sign forced onto every contribution of an aggregation.
///
/// Expenses are summed `Negative`, income `Positive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignMode {
    /// `+|x|`
    Positive,
    /// `-|x|`
    Negative,
}

impl SignMode {
    /// Applies the sign to an amount.
    #[must_use]
    pub fn apply(self, amount: &BigDecimal) -> BigDecimal {
        match self {
            Self::Positive => positive(amount),
            Self::Negative => negative(amount),
        }
    }

    /// The other mode.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}
