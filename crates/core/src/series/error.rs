//! Series error types.

use tally_shared::AppError;
use thiserror::Error;

use crate::currency::CurrencyError;
use crate::transaction::RecordError;

/// Errors raised while building a time series.
#[derive(Debug, Error)]
pub enum SeriesError {
    /// Period name not recognised.
    #[error("Unknown period: {0:?}")]
    UnknownPeriod(String),

    /// A snapshot references a currency the directory does not know.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// A record broke the ledger contract.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// A rounded value does not fit a chart entry.
    #[error("{currency} value {value} is out of range for a chart entry")]
    Overflow {
        /// Currency code.
        currency: String,
        /// The rounded value.
        value: String,
    },
}

impl From<SeriesError> for AppError {
    fn from(err: SeriesError) -> Self {
        match err {
            SeriesError::UnknownPeriod(_) => Self::Validation(err.to_string()),
            SeriesError::Currency(_) | SeriesError::Record(_) | SeriesError::Overflow { .. } => {
                Self::DataIntegrity(err.to_string())
            }
        }
    }
}
