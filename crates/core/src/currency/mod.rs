//! Currency metadata, exchange rates and conversion.

pub mod conversion;
pub mod converter;
pub mod directory;
pub mod error;
pub mod exchange;

pub use conversion::{convert_amount, round_for_currency};
pub use converter::{ConverterStats, ExchangeRateConverter};
pub use directory::{CurrencyDirectory, CurrencyInfo, InMemoryCurrencyDirectory};
pub use error::CurrencyError;
pub use exchange::{ExchangeRate, InMemoryRateProvider, RateProvider};
