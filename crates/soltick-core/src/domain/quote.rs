use serde::{Deserialize, Serialize};

use crate::{ProviderId, TokenSymbol, ValidationError};

/// Normalized USD price observation produced by a provider adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price_usd: f64,
    pub name: String,
    pub symbol: TokenSymbol,
    pub provider: ProviderId,
}

impl PriceQuote {
    pub fn new(
        price_usd: f64,
        name: impl Into<String>,
        symbol: &str,
        provider: ProviderId,
    ) -> Result<Self, ValidationError> {
        validate_positive("price_usd", price_usd)?;

        let symbol = TokenSymbol::parse(symbol)?;
        let name = name.into();
        let name = match name.trim() {
            "" => symbol.as_str().to_owned(),
            trimmed => trimmed.to_owned(),
        };

        Ok(Self {
            price_usd,
            name,
            symbol,
            provider,
        })
    }
}

/// Parse a decimal price that some providers transmit as a JSON string.
pub fn parse_decimal_price(field: &'static str, raw: &str) -> Result<f64, ValidationError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::NonFiniteValue { field })?;
    validate_positive(field, value)?;
    Ok(value)
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositiveValue { field });
    }
    Ok(())
}
