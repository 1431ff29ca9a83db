//! Currency error types.

use chrono::NaiveDate;
use tally_shared::types::CurrencyId;
use thiserror::Error;

/// Errors raised by currency lookups.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CurrencyError {
    /// No currency with this id.
    #[error("Currency #{0} not found")]
    UnknownId(CurrencyId),

    /// No currency with this code.
    #[error("Currency '{0}' not found")]
    UnknownCode(String),

    /// No exchange rate available.
    #[error("No exchange rate found for {from}/{to} on or before {date}")]
    RateNotFound {
        /// Source currency code.
        from: String,
        /// Target currency code.
        to: String,
        /// Requested as-of date.
        date: NaiveDate,
    },

    /// The rate provider itself failed (network, storage, ...).
    #[error("Exchange rate provider unavailable: {0}")]
    ProviderUnavailable(String),
}
