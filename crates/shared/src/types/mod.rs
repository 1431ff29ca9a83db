//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{
    AmountError, display_float, exact, narrow, negative, parse_amount, plain, positive,
    round_half_away, serialize_plain, serialize_plain_option,
};
