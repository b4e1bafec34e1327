//! Price source trait and adapter error taxonomy.
//!
//! Every upstream provider implements [`PriceSource`]. The resolver only cares
//! whether a call succeeded; the [`SourceErrorKind`] is used by the retry
//! policy to decide what is worth retrying and by logs for provenance.
//!
//! | Kind | Retryable | Typical cause |
//! |------|-----------|---------------|
//! | `Transient` | yes | connect/timeout failure, HTTP 5xx or 408 |
//! | `RateLimited` | yes | HTTP 429 |
//! | `MalformedResponse` | no | missing or mistyped JSON fields |
//! | `NotFound` | no | provider has no data for the token |
//! | `InvalidRequest` | no | HTTP 4xx other than 408/429 |
//! | `Exhausted` | no | retry policy gave up |
//! | `AdapterNotRegistered` | no | provider requested but not configured |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{PriceQuote, ProviderConfig, ProviderId, TokenId};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Transient,
    RateLimited,
    MalformedResponse,
    NotFound,
    InvalidRequest,
    Exhausted,
    AdapterNotRegistered,
}

/// Structured source error returned by adapters and the retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Transient,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn exhausted(attempts: u32, last: &SourceError) -> Self {
        Self {
            kind: SourceErrorKind::Exhausted,
            message: format!("gave up after {attempts} attempt(s): {}", last.message),
            retryable: false,
        }
    }

    pub fn adapter_not_registered(provider: ProviderId) -> Self {
        Self {
            kind: SourceErrorKind::AdapterNotRegistered,
            message: format!("source adapter '{provider}' is not registered"),
            retryable: false,
        }
    }

    /// Classify a non-2xx HTTP status returned by `provider`.
    pub fn from_status(provider: ProviderId, status: u16) -> Self {
        match status {
            429 => Self::rate_limited(format!("{provider} rate limited the request (429)")),
            404 => Self::not_found(format!("{provider} returned status 404")),
            408 | 500..=599 => Self::transient(format!("{provider} returned status {status}")),
            _ => Self::invalid_request(format!("{provider} returned status {status}")),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transient => "source.transient",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::MalformedResponse => "source.malformed_response",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Exhausted => "source.exhausted",
            SourceErrorKind::AdapterNotRegistered => "source.adapter_not_registered",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Price source adapter contract.
///
/// Implementations translate one upstream API into [`PriceQuote`]s. They must
/// classify every failure into a [`SourceError`]; transport errors never leak.
///
/// # Example Implementation
///
/// ```rust,ignore
/// impl PriceSource for MyAdapter {
///     fn id(&self) -> ProviderId {
///         ProviderId::Jupiter
///     }
///
///     fn config(&self) -> &ProviderConfig {
///         &self.config
///     }
///
///     fn reference_price<'a>(&'a self) -> SourceFuture<'a, PriceQuote> {
///         Box::pin(async move { /* fetch and normalize */ })
///     }
///
///     fn token_quote<'a>(&'a self, token: &'a TokenId) -> SourceFuture<'a, PriceQuote> {
///         Box::pin(async move { /* fetch and normalize */ })
///     }
/// }
/// ```
pub trait PriceSource: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Returns the static descriptor this adapter was built from.
    fn config(&self) -> &ProviderConfig;

    /// Fetches the USD price of the provider's configured reference asset.
    fn reference_price<'a>(&'a self) -> SourceFuture<'a, PriceQuote>;

    /// Fetches a normalized USD quote for `token`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the provider is unreachable, rate limited,
    /// returns an unexpected payload, or has no data for the token.
    fn token_quote<'a>(&'a self, token: &'a TokenId) -> SourceFuture<'a, PriceQuote>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        let cases = [
            (429, SourceErrorKind::RateLimited, true),
            (404, SourceErrorKind::NotFound, false),
            (503, SourceErrorKind::Transient, true),
            (408, SourceErrorKind::Transient, true),
            (400, SourceErrorKind::InvalidRequest, false),
            (401, SourceErrorKind::InvalidRequest, false),
        ];

        for (status, kind, retryable) in cases {
            let error = SourceError::from_status(ProviderId::Coingecko, status);
            assert_eq!(error.kind(), kind, "status {status}");
            assert_eq!(error.retryable(), retryable, "status {status}");
        }
    }

    #[test]
    fn exhausted_wraps_last_message_and_is_terminal() {
        let last = SourceError::rate_limited("coingecko rate limited the request (429)");
        let error = SourceError::exhausted(3, &last);

        assert_eq!(error.kind(), SourceErrorKind::Exhausted);
        assert!(!error.retryable());
        assert!(error.message().contains("3 attempt(s)"));
        assert!(error.message().contains("429"));
        assert_eq!(error.code(), "source.exhausted");
    }
}
