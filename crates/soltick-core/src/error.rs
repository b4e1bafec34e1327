use thiserror::Error;

/// Validation and contract errors exposed by `soltick-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("token id cannot be empty")]
    EmptyTokenId,
    #[error("token id length {len} exceeds max {max}")]
    TokenIdTooLong { len: usize, max: usize },
    #[error("token id contains whitespace at index {index}")]
    TokenIdWhitespace { index: usize },

    #[error("token symbol cannot be empty")]
    EmptySymbol,
    #[error("token symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid provider '{value}', expected one of coingecko, dexscreener, jupiter")]
    InvalidSource { value: String },
    #[error("provider list cannot be empty")]
    EmptyProviderList,

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be greater than zero")]
    NonPositiveValue { field: &'static str },

    #[error("invalid value '{value}' for configuration key '{key}'")]
    InvalidConfig { key: &'static str, value: String },
}

/// Error raised by the exchange-rate calculator.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RateError {
    #[error("exchange rate is undefined for prices {left} and {right}")]
    DivisionUndefined { left: f64, right: f64 },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
