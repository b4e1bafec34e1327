//! # Domain Models
//!
//! Canonical domain types for soltick price resolution.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TokenId`] | Validated mint address or provider-internal id |
//! | [`TokenSymbol`] | Uppercased ticker |
//! | [`PriceQuote`] | Normalized USD price from one provider |
//! | [`ExchangeRate`] | Bidirectional ratio between two USD prices |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! All types enforce their invariants at construction time, so a `PriceQuote`
//! always carries a positive finite price and an uppercase symbol.

mod quote;
mod rate;
mod timestamp;
mod token;

pub use quote::{parse_decimal_price, PriceQuote};
pub use rate::{calculate_rate, ExchangeRate};
pub use timestamp::UtcDateTime;
pub use token::{TokenId, TokenSymbol};
