//! Currency-aware transaction aggregation.
//!
//! This module provides:
//! - Bucket keys, accumulators and the emitted sum shape
//! - Grouping key functions (currency, account, category, budget, tag, period)
//! - The transaction summarizer that applies a conversion policy and sign mode

pub mod aggregator;
pub mod bucket;
pub mod error;
pub mod grouping;

#[cfg(test)]
mod props;

pub use aggregator::{AggregateOptions, TransactionSummarizer};
pub use bucket::{BucketKey, BucketMap, CurrencyBucket, EntityRef, GroupSlot, SortOrder, SumEntry};
pub use error::SummaryError;
pub use grouping::{Direction, by_account, by_budget, by_category, by_currency, by_period, by_tag};
