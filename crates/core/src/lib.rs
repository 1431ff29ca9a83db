//! Core reporting logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Records arrive already materialized; everything here folds them into
//! exact decimal sums and time series.
//!
//! # Modules
//!
//! - `transaction` - The flat transaction record reports consume
//! - `currency` - Currency metadata, exchange rates and the request-scoped converter
//! - `policy` - Which currency and amount a record is attributed to
//! - `summary` - Grouped, currency-aware aggregation
//! - `series` - Balance and flow series over fixed periods
//! - `reports` - Account, category, budget, tag, insight and chart façades

pub mod currency;
pub mod policy;
pub mod reports;
pub mod series;
pub mod summary;
pub mod transaction;
