//! Static provider descriptors and runtime tuning knobs.
//!
//! # Environment Variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `SOLTICK_PROVIDERS` | `jupiter,dexscreener,coingecko` | Fallback order |
//! | `SOLTICK_CACHE_TTL_SECS` | `300` | Cache entry lifetime (0 disables) |
//! | `SOLTICK_RETRY_MAX_ATTEMPTS` | `3` | Attempts per upstream call |
//! | `SOLTICK_RETRY_BASE_DELAY_MS` | `1000` | First backoff delay |
//! | `SOLTICK_PROVIDER_DELAY_MS` | `500` | Pause between providers |
//! | `SOLTICK_TIMEOUT_MS` | `15000` | Per-request timeout |
//! | `SOLTICK_COINGECKO_API_KEY` | - | Sent as `x-cg-demo-api-key` |
//! | `SOLTICK_JUPITER_API_KEY` | - | Sent as `x-api-key` |

use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::retry::RetryPolicy;
use crate::{ProviderId, ValidationError};

/// Wrapped SOL mint, the reference asset on Solana DEX venues.
pub const WRAPPED_SOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Nominal upstream request budget. Informational only; nothing throttles on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitHint {
    pub requests: u32,
    pub window: Duration,
}

impl RateLimitHint {
    pub const fn per_minute(requests: u32) -> Self {
        Self {
            requests,
            window: Duration::from_secs(60),
        }
    }
}

/// Asset every token is priced against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceAsset {
    /// Identifier in the provider's namespace (mint address or internal id).
    pub id: String,
    pub name: String,
    pub symbol: String,
}

impl ReferenceAsset {
    pub fn new(id: impl Into<String>, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
        }
    }

    /// Wrapped SOL as quoted by on-chain venues.
    pub fn wrapped_sol() -> Self {
        Self::new(WRAPPED_SOL_MINT, "Wrapped SOL", "SOL")
    }

    /// SOL under the given provider-specific identifier.
    pub fn sol(id: impl Into<String>) -> Self {
        Self::new(id, "Solana", "SOL")
    }
}

/// Immutable per-provider descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub id: ProviderId,
    pub display_name: &'static str,
    pub base_url: String,
    /// Secondary endpoint for providers that split price and metadata APIs.
    pub metadata_url: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub reference_asset: ReferenceAsset,
    pub rate_limit_hint: RateLimitHint,
}

impl ProviderConfig {
    pub fn coingecko() -> Self {
        Self {
            id: ProviderId::Coingecko,
            display_name: "CoinGecko",
            base_url: String::from("https://api.coingecko.com/api/v3"),
            metadata_url: None,
            headers: BTreeMap::new(),
            reference_asset: ReferenceAsset::sol("solana"),
            rate_limit_hint: RateLimitHint::per_minute(30),
        }
    }

    pub fn dexscreener() -> Self {
        Self {
            id: ProviderId::Dexscreener,
            display_name: "DEX Screener",
            base_url: String::from("https://api.dexscreener.com"),
            metadata_url: None,
            headers: BTreeMap::new(),
            reference_asset: ReferenceAsset::wrapped_sol(),
            rate_limit_hint: RateLimitHint::per_minute(300),
        }
    }

    pub fn jupiter() -> Self {
        Self {
            id: ProviderId::Jupiter,
            display_name: "Jupiter",
            base_url: String::from("https://api.jup.ag"),
            metadata_url: Some(String::from("https://tokens.jup.ag")),
            headers: BTreeMap::new(),
            reference_asset: ReferenceAsset::wrapped_sol(),
            rate_limit_hint: RateLimitHint::per_minute(600),
        }
    }

    pub fn default_for(id: ProviderId) -> Self {
        match id {
            ProviderId::Coingecko => Self::coingecko(),
            ProviderId::Dexscreener => Self::dexscreener(),
            ProviderId::Jupiter => Self::jupiter(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_metadata_url(mut self, metadata_url: impl Into<String>) -> Self {
        self.metadata_url = Some(metadata_url.into().trim_end_matches('/').to_owned());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Replace the reference asset (defaults to SOL for every provider).
    pub fn with_reference_asset(mut self, reference_asset: ReferenceAsset) -> Self {
        self.reference_asset = reference_asset;
        self
    }
}

/// Runtime configuration shared by the resolver and its adapters.
#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    pub providers: Vec<ProviderId>,
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
    pub provider_delay: Duration,
    pub request_timeout: Duration,
    pub coingecko_api_key: Option<String>,
    pub jupiter_api_key: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            providers: vec![
                ProviderId::Jupiter,
                ProviderId::Dexscreener,
                ProviderId::Coingecko,
            ],
            cache_ttl: DEFAULT_TTL,
            retry: RetryPolicy::default(),
            provider_delay: Duration::from_millis(500),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            coingecko_api_key: None,
            jupiter_api_key: None,
        }
    }
}

impl CoreConfig {
    /// Build from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(value) = get("SOLTICK_PROVIDERS") {
            config.providers = ProviderId::parse_list(&value)?;
        }
        if let Some(value) = get("SOLTICK_CACHE_TTL_SECS") {
            config.cache_ttl = Duration::from_secs(parse_u64("SOLTICK_CACHE_TTL_SECS", &value)?);
        }
        if let Some(value) = get("SOLTICK_RETRY_MAX_ATTEMPTS") {
            let attempts = parse_u64("SOLTICK_RETRY_MAX_ATTEMPTS", &value)?;
            config.retry.max_attempts = u32::try_from(attempts)
                .ok()
                .filter(|attempts| *attempts > 0)
                .ok_or(ValidationError::InvalidConfig {
                    key: "SOLTICK_RETRY_MAX_ATTEMPTS",
                    value,
                })?;
        }
        if let Some(value) = get("SOLTICK_RETRY_BASE_DELAY_MS") {
            let base = parse_u64("SOLTICK_RETRY_BASE_DELAY_MS", &value)?;
            config.retry = RetryPolicy::exponential(
                config.retry.max_attempts,
                Duration::from_millis(base),
            );
        }
        if let Some(value) = get("SOLTICK_PROVIDER_DELAY_MS") {
            config.provider_delay =
                Duration::from_millis(parse_u64("SOLTICK_PROVIDER_DELAY_MS", &value)?);
        }
        if let Some(value) = get("SOLTICK_TIMEOUT_MS") {
            config.request_timeout =
                Duration::from_millis(parse_u64("SOLTICK_TIMEOUT_MS", &value)?);
        }
        config.coingecko_api_key = get("SOLTICK_COINGECKO_API_KEY");
        config.jupiter_api_key = get("SOLTICK_JUPITER_API_KEY");

        Ok(config)
    }

    /// Provider descriptor for `id` with API keys from this configuration applied.
    pub fn provider_config(&self, id: ProviderId) -> ProviderConfig {
        let config = ProviderConfig::default_for(id);
        match (id, &self.coingecko_api_key, &self.jupiter_api_key) {
            (ProviderId::Coingecko, Some(key), _) => config.with_header("x-cg-demo-api-key", key),
            (ProviderId::Jupiter, _, Some(key)) => config.with_header("x-api-key", key),
            _ => config,
        }
    }
}

fn parse_u64(key: &'static str, value: &str) -> Result<u64, ValidationError> {
    value.parse().map_err(|_| ValidationError::InvalidConfig {
        key,
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = CoreConfig::from_lookup(|_| None).expect("defaults are valid");

        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_for_attempt(0), Duration::from_secs(1));
        assert_eq!(config.provider_delay, Duration::from_millis(500));
    }

    #[test]
    fn environment_overrides_are_applied() {
        let config = CoreConfig::from_lookup(lookup(&[
            ("SOLTICK_PROVIDERS", "coingecko,jupiter"),
            ("SOLTICK_CACHE_TTL_SECS", "60"),
            ("SOLTICK_RETRY_MAX_ATTEMPTS", "5"),
            ("SOLTICK_RETRY_BASE_DELAY_MS", "250"),
            ("SOLTICK_PROVIDER_DELAY_MS", "0"),
            ("SOLTICK_COINGECKO_API_KEY", "cg-key"),
            ("SOLTICK_JUPITER_API_KEY", " "),
        ]))
        .expect("overrides are valid");

        assert_eq!(
            config.providers,
            vec![ProviderId::Coingecko, ProviderId::Jupiter]
        );
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(config.provider_delay, Duration::ZERO);
        assert_eq!(config.jupiter_api_key, None);

        let coingecko = config.provider_config(ProviderId::Coingecko);
        assert_eq!(
            coingecko.headers.get("x-cg-demo-api-key").map(String::as_str),
            Some("cg-key")
        );
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let error = CoreConfig::from_lookup(lookup(&[("SOLTICK_RETRY_MAX_ATTEMPTS", "0")]))
            .expect_err("zero attempts is invalid");
        assert!(matches!(
            error,
            ValidationError::InvalidConfig {
                key: "SOLTICK_RETRY_MAX_ATTEMPTS",
                ..
            }
        ));

        assert!(CoreConfig::from_lookup(lookup(&[("SOLTICK_TIMEOUT_MS", "soon")])).is_err());
    }

    #[test]
    fn every_provider_uses_sol_as_reference_by_default() {
        assert_eq!(ProviderConfig::coingecko().reference_asset.id, "solana");
        assert_eq!(ProviderConfig::dexscreener().reference_asset.id, WRAPPED_SOL_MINT);
        assert_eq!(ProviderConfig::jupiter().reference_asset.symbol, "SOL");

        let custom = ProviderConfig::coingecko()
            .with_reference_asset(ReferenceAsset::new("ethereum", "Ethereum", "ETH"));
        assert_eq!(custom.reference_asset.id, "ethereum");
    }
}
