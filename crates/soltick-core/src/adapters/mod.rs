//! Upstream provider adapters.
//!
//! Each adapter owns one [`ProviderConfig`](crate::ProviderConfig) and talks to
//! its API through the shared [`HttpClient`] seam. Every GET runs under the
//! adapter's [`RetryPolicy`]; only the transport and HTTP status are retried,
//! payload decoding happens once the body is in hand.

pub mod coingecko;
pub mod dexscreener;
pub mod jupiter;

pub use coingecko::CoingeckoAdapter;
pub use dexscreener::DexscreenerAdapter;
pub use jupiter::JupiterAdapter;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpRequest, DEFAULT_TIMEOUT_MS};
use crate::retry::RetryPolicy;
use crate::{ProviderConfig, ProviderId};

/// Transport bundle shared by every adapter.
#[derive(Clone)]
pub struct Transport {
    http_client: Arc<dyn HttpClient>,
    retry: RetryPolicy,
    timeout_ms: u64,
}

impl Transport {
    pub fn new(http_client: Arc<dyn HttpClient>, retry: RetryPolicy) -> Self {
        Self {
            http_client,
            retry,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Build a GET for `url` carrying the provider's static headers.
    pub(crate) fn request(&self, config: &ProviderConfig, url: String) -> HttpRequest {
        HttpRequest::get(url)
            .with_headers(&config.headers)
            .with_timeout_ms(self.timeout_ms)
    }

    /// Fetch a raw 2xx body, retrying transient and rate-limited failures.
    pub(crate) async fn fetch_body(
        &self,
        provider: ProviderId,
        request: HttpRequest,
    ) -> Result<String, SourceError> {
        let http_client = self.http_client.as_ref();

        self.retry
            .execute(|| {
                let request = request.clone();
                async move {
                    debug!(provider = %provider, url = %request.url, "upstream GET");
                    let response = http_client.execute(request).await.map_err(|e| {
                        if e.retryable() {
                            SourceError::transient(format!(
                                "{provider} transport error: {}",
                                e.message()
                            ))
                        } else {
                            SourceError::invalid_request(format!(
                                "{provider} request could not be sent: {}",
                                e.message()
                            ))
                        }
                    })?;

                    if !response.is_success() {
                        return Err(SourceError::from_status(provider, response.status));
                    }

                    Ok(response.body)
                }
            })
            .await
    }

    /// Fetch and decode a JSON body. Decoding failures are not retried.
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        provider: ProviderId,
        request: HttpRequest,
    ) -> Result<T, SourceError> {
        let body = self.fetch_body(provider, request).await?;
        decode_json(provider, &body)
    }
}

pub(crate) fn decode_json<T: DeserializeOwned>(
    provider: ProviderId,
    body: &str,
) -> Result<T, SourceError> {
    serde_json::from_str(body).map_err(|e| {
        SourceError::malformed(format!("failed to parse {provider} response: {e}"))
    })
}
