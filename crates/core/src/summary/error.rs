//! Summary error types.

use tally_shared::AppError;
use thiserror::Error;

use crate::transaction::RecordError;

/// Errors raised by the transaction summarizer.
///
/// Every variant is a data-integrity problem; rate lookup failures never
/// surface here.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// A record broke the ledger contract.
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl From<SummaryError> for AppError {
    fn from(err: SummaryError) -> Self {
        Self::DataIntegrity(err.to_string())
    }
}
