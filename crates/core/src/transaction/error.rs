//! Record contract violations.

use tally_shared::types::{CurrencyId, JournalId};
use thiserror::Error;

/// A record broke the ledger contract.
///
/// These are never recovered from; the ledger layer is expected to hand
/// over complete records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Foreign amount present without a foreign currency.
    #[error("Journal #{0} has a foreign amount but no foreign currency")]
    ForeignAmountWithoutCurrency(JournalId),

    /// Foreign currency id present but its metadata is missing.
    #[error("Journal #{journal_id} references foreign currency #{currency_id} without code or decimal places")]
    IncompleteForeignCurrency {
        /// Offending journal.
        journal_id: JournalId,
        /// Foreign currency id.
        currency_id: CurrencyId,
    },

    /// Native currency metadata is missing.
    #[error("Journal #{0} has no currency code")]
    MissingCurrency(JournalId),
}
