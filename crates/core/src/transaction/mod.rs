//! Flat transaction records as delivered by the ledger query layer.
//!
//! One record is one leg of a journal, already filtered by date range,
//! account set and transaction type. Nothing in this crate re-filters them.

pub mod error;
pub mod types;

pub use error::RecordError;
pub use types::{TagRef, TransactionRecord, TransactionType};
