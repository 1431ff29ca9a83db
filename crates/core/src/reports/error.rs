//! Report error types.

use tally_shared::AppError;
use tally_shared::types::AccountId;
use thiserror::Error;

use crate::currency::CurrencyError;
use crate::series::SeriesError;
use crate::summary::SummaryError;
use crate::transaction::RecordError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The ledger query failed.
    #[error("Ledger query failed: {0}")]
    Query(String),

    /// Account not known to the ledger.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// Aggregation failed.
    #[error(transparent)]
    Summary(#[from] SummaryError),

    /// Series construction failed.
    #[error(transparent)]
    Series(#[from] SeriesError),

    /// A currency could not be resolved.
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    /// A record broke the ledger contract.
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl From<ReportError> for AppError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Query(message) => Self::ExternalService(message),
            ReportError::AccountNotFound(id) => Self::NotFound(format!("Account {id}")),
            ReportError::Series(inner) => inner.into(),
            other => Self::DataIntegrity(other.to_string()),
        }
    }
}
