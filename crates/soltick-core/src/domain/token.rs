use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TOKEN_ID_LEN: usize = 128;

/// Token identifier as understood by an adapter: an on-chain mint address or a
/// provider-internal id. Case is preserved because base58 addresses are case sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenId(String);

impl TokenId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTokenId);
        }

        let len = trimmed.chars().count();
        if len > MAX_TOKEN_ID_LEN {
            return Err(ValidationError::TokenIdTooLong {
                len,
                max: MAX_TOKEN_ID_LEN,
            });
        }

        if let Some(index) = trimmed.chars().position(char::is_whitespace) {
            return Err(ValidationError::TokenIdWhitespace { index });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used for case-insensitive catalog lookups and cache keys.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

impl Display for TokenId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for TokenId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for TokenId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TokenId> for String {
    fn from(value: TokenId) -> Self {
        value.0
    }
}

/// Normalized (uppercase) token ticker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenSymbol(String);

impl TokenSymbol {
    /// Parse and normalize a ticker to uppercase.
    ///
    /// Inner spaces (`"ai 16z"`) and long names are kept. Only control
    /// characters are refused.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        if let Some((index, ch)) = trimmed.chars().enumerate().find(|(_, ch)| ch.is_control()) {
            return Err(ValidationError::SymbolInvalidChar { ch, index });
        }

        Ok(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TokenSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for TokenSymbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TokenSymbol> for String {
    fn from(value: TokenSymbol) -> Self {
        value.0
    }
}
