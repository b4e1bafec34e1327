use std::collections::{HashMap, HashSet};
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::adapters::{CoingeckoAdapter, DexscreenerAdapter, JupiterAdapter, Transport};
use crate::cache::CacheStore;
use crate::data_source::{PriceSource, SourceError};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{
    calculate_rate, CoreConfig, ExchangeRate, PriceQuote, ProviderId, RateError, TokenId,
    TokenSymbol, UtcDateTime,
};

/// Default pause before each provider after the first.
pub const DEFAULT_PROVIDER_DELAY: Duration = Duration::from_millis(500);

/// Progress of a single resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// Neither the reference price nor the token quote is known.
    Pending,
    /// Reference price known, token quote still missing.
    PartialReference,
    /// Token quote known, reference price still missing.
    PartialQuote,
    Resolved,
    /// Provider list ran out before both halves were known.
    Exhausted,
}

impl ResolutionState {
    pub const fn from_parts(has_reference: bool, has_quote: bool) -> Self {
        match (has_reference, has_quote) {
            (false, false) => Self::Pending,
            (true, false) => Self::PartialReference,
            (false, true) => Self::PartialQuote,
            (true, true) => Self::Resolved,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Exhausted)
    }
}

/// Why a resolution gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailureKind {
    NoReferencePrice,
    NoTokenQuote,
    AllProvidersExhausted,
}

impl ResolutionFailureKind {
    /// Map the last non-terminal state to the failure it implies.
    pub const fn from_state(state: ResolutionState) -> Self {
        match state {
            ResolutionState::PartialReference => Self::NoTokenQuote,
            ResolutionState::PartialQuote => Self::NoReferencePrice,
            _ => Self::AllProvidersExhausted,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoReferencePrice => "no_reference_price",
            Self::NoTokenQuote => "no_token_quote",
            Self::AllProvidersExhausted => "all_providers_exhausted",
        }
    }

    /// Short suggestion for the user.
    pub const fn hint(self) -> &'static str {
        match self {
            Self::NoReferencePrice => {
                "no provider returned a reference price; check connectivity and retry"
            }
            Self::NoTokenQuote => {
                "no provider could quote the token; verify the token address"
            }
            Self::AllProvidersExhausted => {
                "every provider failed; check connectivity or try a different provider order"
            }
        }
    }
}

impl Display for ResolutionFailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failed provider call, kept for provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: ProviderId,
    pub error: SourceError,
}

/// Successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub token: TokenId,
    pub reference_price_usd: f64,
    pub reference_symbol: TokenSymbol,
    pub quote: PriceQuote,
    /// Last provider that contributed either half.
    pub source: ProviderId,
    pub source_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub errors: Vec<ProviderFailure>,
    pub latency_ms: u64,
    pub resolved_at: UtcDateTime,
}

impl Resolution {
    /// Reference-to-token and token-to-reference ratios.
    pub fn rate(&self) -> Result<ExchangeRate, RateError> {
        calculate_rate(self.reference_price_usd, self.quote.price_usd)
    }
}

/// Failed resolution. Carries no partial price data.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} for token '{token}' after {} provider(s): {}", .source_chain.len(), .kind.hint())]
pub struct ResolutionFailure {
    pub kind: ResolutionFailureKind,
    pub token: TokenId,
    /// Furthest state reached before the provider list ran out.
    pub reached: ResolutionState,
    pub source_chain: Vec<ProviderId>,
    pub errors: Vec<ProviderFailure>,
    pub latency_ms: u64,
}

impl ResolutionFailure {
    pub const fn state(&self) -> ResolutionState {
        ResolutionState::Exhausted
    }

    pub const fn hint(&self) -> &'static str {
        self.kind.hint()
    }
}

pub type ResolutionOutcome = Result<Resolution, ResolutionFailure>;

/// Two resolutions and the ratio between their USD prices.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: ResolutionOutcome,
    pub right: ResolutionOutcome,
    /// Present only when both sides resolved.
    pub rate: Option<ExchangeRate>,
}

/// Adapter registry and fallback engine.
pub struct PriceResolver {
    sources: HashMap<ProviderId, Arc<dyn PriceSource>>,
    provider_delay: Duration,
}

impl PriceResolver {
    pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Self {
        let sources = sources
            .into_iter()
            .map(|source| (source.id(), source))
            .collect();
        Self {
            sources,
            provider_delay: DEFAULT_PROVIDER_DELAY,
        }
    }

    pub fn with_provider_delay(mut self, provider_delay: Duration) -> Self {
        self.provider_delay = provider_delay;
        self
    }

    /// Walk `chain` in order until both the reference price and the token
    /// quote are known.
    pub async fn resolve(&self, token: &TokenId, chain: &[ProviderId]) -> ResolutionOutcome {
        let started = Instant::now();
        let planned_chain = dedupe_chain(chain);
        let mut source_chain = Vec::with_capacity(planned_chain.len());
        let mut errors = Vec::new();

        let mut reference: Option<PriceQuote> = None;
        let mut quote: Option<PriceQuote> = None;
        let mut source = None;
        let mut state = ResolutionState::Pending;

        for (index, provider) in planned_chain.into_iter().enumerate() {
            if index > 0 && !self.provider_delay.is_zero() {
                tokio::time::sleep(self.provider_delay).await;
            }
            source_chain.push(provider);

            let Some(adapter) = self.sources.get(&provider) else {
                warn!(provider = %provider, "provider requested but not registered");
                errors.push(ProviderFailure {
                    provider,
                    error: SourceError::adapter_not_registered(provider),
                });
                continue;
            };

            let mut contributed = false;

            if reference.is_none() {
                match adapter.reference_price().await {
                    Ok(price) => {
                        debug!(
                            provider = %provider,
                            price_usd = price.price_usd,
                            "reference price"
                        );
                        reference = Some(price);
                        contributed = true;
                    }
                    Err(error) => {
                        warn!(provider = %provider, error = %error, "reference price failed");
                        errors.push(ProviderFailure { provider, error });
                    }
                }
            }

            if quote.is_none() {
                match adapter.token_quote(token).await {
                    Ok(found) => {
                        debug!(
                            provider = %provider,
                            token = %token,
                            price_usd = found.price_usd,
                            "token quote"
                        );
                        quote = Some(found);
                        contributed = true;
                    }
                    Err(error) => {
                        warn!(
                            provider = %provider,
                            token = %token,
                            error = %error,
                            "token quote failed"
                        );
                        errors.push(ProviderFailure { provider, error });
                    }
                }
            }

            if contributed {
                source = Some(provider);
            }
            state = ResolutionState::from_parts(reference.is_some(), quote.is_some());

            if let (Some(reference), Some(quote), Some(source)) = (&reference, &quote, source) {
                let mut warnings = Vec::new();
                if !errors.is_empty() {
                    warnings.push(format!(
                        "resolved via '{source}' after {} failed provider call(s)",
                        errors.len()
                    ));
                }
                if reference.provider != quote.provider {
                    warnings.push(format!(
                        "reference price from '{}' combined with token quote from '{}'",
                        reference.provider, quote.provider
                    ));
                }

                let latency_ms = elapsed_ms(started);
                info!(token = %token, source = %source, latency_ms, "token resolved");
                return Ok(Resolution {
                    token: token.clone(),
                    reference_price_usd: reference.price_usd,
                    reference_symbol: reference.symbol.clone(),
                    quote: quote.clone(),
                    source,
                    source_chain,
                    warnings,
                    errors,
                    latency_ms,
                    resolved_at: UtcDateTime::now(),
                });
            }
        }

        let kind = ResolutionFailureKind::from_state(state);
        let latency_ms = elapsed_ms(started);
        warn!(
            token = %token,
            kind = %kind,
            attempts = source_chain.len(),
            latency_ms,
            "token resolution exhausted"
        );
        Err(ResolutionFailure {
            kind,
            token: token.clone(),
            reached: state,
            source_chain,
            errors,
            latency_ms,
        })
    }

    /// Resolve several tokens concurrently. Results keep input order.
    pub async fn resolve_many(
        &self,
        tokens: &[TokenId],
        chain: &[ProviderId],
    ) -> Vec<ResolutionOutcome> {
        join_all(tokens.iter().map(|token| self.resolve(token, chain))).await
    }

    /// Resolve two tokens and relate their USD prices.
    pub async fn compare(
        &self,
        left: &TokenId,
        right: &TokenId,
        chain: &[ProviderId],
    ) -> Comparison {
        let (left, right) = tokio::join!(self.resolve(left, chain), self.resolve(right, chain));
        let rate = match (&left, &right) {
            (Ok(left), Ok(right)) => {
                calculate_rate(left.quote.price_usd, right.quote.price_usd).ok()
            }
            _ => None,
        };

        Comparison { left, right, rate }
    }
}

/// Builds a resolver with real adapters from [`CoreConfig`].
///
/// All adapters share one [`CacheStore`] and one HTTP client.
///
/// # Example
///
/// ```rust,ignore
/// use soltick_core::{CoreConfig, PriceResolverBuilder};
///
/// let config = CoreConfig::from_env()?;
/// let resolver = PriceResolverBuilder::from_config(&config).build();
/// ```
pub struct PriceResolverBuilder {
    config: CoreConfig,
    http_client: Option<Arc<dyn HttpClient>>,
    cache: Option<CacheStore>,
    base_urls: HashMap<ProviderId, String>,
}

impl PriceResolverBuilder {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            config: config.clone(),
            http_client: None,
            cache: None,
            base_urls: HashMap::new(),
        }
    }

    /// Replace the transport (defaults to [`ReqwestHttpClient`]).
    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// Share an existing cache instead of creating one from the TTL.
    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Point one provider at a different base URL.
    pub fn with_base_url(mut self, provider: ProviderId, base_url: impl Into<String>) -> Self {
        self.base_urls.insert(provider, base_url.into());
        self
    }

    pub fn build(self) -> PriceResolver {
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let cache = self
            .cache
            .unwrap_or_else(|| CacheStore::new(self.config.cache_ttl));
        let timeout_ms = u64::try_from(self.config.request_timeout.as_millis()).unwrap_or(u64::MAX);
        let transport =
            Transport::new(http_client, self.config.retry.clone()).with_timeout_ms(timeout_ms);

        let provider_config = |id: ProviderId| {
            let config = self.config.provider_config(id);
            match self.base_urls.get(&id) {
                Some(base_url) => config.with_base_url(base_url.as_str()),
                None => config,
            }
        };

        let sources: Vec<Arc<dyn PriceSource>> = vec![
            Arc::new(JupiterAdapter::new(
                provider_config(ProviderId::Jupiter),
                transport.clone(),
            )),
            Arc::new(DexscreenerAdapter::new(
                provider_config(ProviderId::Dexscreener),
                transport.clone(),
            )),
            Arc::new(CoingeckoAdapter::new(
                provider_config(ProviderId::Coingecko),
                transport,
                cache,
            )),
        ];

        PriceResolver::new(sources).with_provider_delay(self.config.provider_delay)
    }
}

fn dedupe_chain(chain: &[ProviderId]) -> Vec<ProviderId> {
    let mut seen = HashSet::new();
    let mut output = Vec::with_capacity(chain.len());

    for provider in chain {
        if seen.insert(*provider) {
            output.push(*provider);
        }
    }

    output
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
