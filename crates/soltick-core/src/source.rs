use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical provider identifiers used in configuration, routing, and history rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Coingecko,
    Dexscreener,
    Jupiter,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Coingecko, Self::Dexscreener, Self::Jupiter];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coingecko => "coingecko",
            Self::Dexscreener => "dexscreener",
            Self::Jupiter => "jupiter",
        }
    }

    /// Parse a comma separated provider list such as `"jupiter, coingecko"`.
    pub fn parse_list(input: &str) -> Result<Vec<Self>, ValidationError> {
        let providers = input
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Self::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if providers.is_empty() {
            return Err(ValidationError::EmptyProviderList);
        }
        Ok(providers)
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "coingecko" => Ok(Self::Coingecko),
            "dexscreener" => Ok(Self::Dexscreener),
            "jupiter" => Ok(Self::Jupiter),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}
