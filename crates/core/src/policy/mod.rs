//! Per-request conversion policy.
//!
//! A [`ConversionPolicy`] is built once per request and passed explicitly
//! to every aggregation; nothing reads it from ambient state.

pub mod conversion;
pub mod sign;

#[cfg(test)]
mod props;

pub use conversion::{AmountSource, ConversionPolicy, ResolvedLeg, ResolvedRecord};
pub use sign::SignMode;
