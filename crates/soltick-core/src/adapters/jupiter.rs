use std::collections::HashMap;

use serde::Deserialize;

use super::Transport;
use crate::data_source::{PriceSource, SourceError, SourceFuture};
use crate::{parse_decimal_price, PriceQuote, ProviderConfig, ProviderId, TokenId};

/// Jupiter adapter: the fast path.
///
/// Prices come from the aggregator price API keyed by mint. Token name and
/// symbol come from the separate token metadata API; the reference asset's
/// labels are taken from configuration instead.
#[derive(Clone)]
pub struct JupiterAdapter {
    config: ProviderConfig,
    transport: Transport,
}

impl JupiterAdapter {
    pub fn new(config: ProviderConfig, transport: Transport) -> Self {
        Self { config, transport }
    }

    async fn usd_price(&self, mint: &str) -> Result<f64, SourceError> {
        let url = format!(
            "{}/price/v2?ids={}",
            self.config.base_url,
            urlencoding::encode(mint)
        );
        let request = self.transport.request(&self.config, url);
        let response: PriceResponse = self.transport.fetch_json(self.id(), request).await?;

        let entry = response
            .data
            .get(mint)
            .and_then(|entry| entry.as_ref())
            .ok_or_else(|| SourceError::not_found(format!("jupiter has no price for '{mint}'")))?;
        let raw = entry.price.as_deref().ok_or_else(|| {
            SourceError::malformed(format!("jupiter price entry for '{mint}' lacks 'price'"))
        })?;

        parse_decimal_price("price", raw)
            .map_err(|e| SourceError::malformed(format!("jupiter price for '{mint}': {e}")))
    }

    async fn metadata(&self, mint: &str) -> Result<TokenMetadata, SourceError> {
        let base = self.config.metadata_url.as_deref().ok_or_else(|| {
            SourceError::invalid_request("jupiter metadata endpoint is not configured")
        })?;
        let url = format!("{base}/token/{}", urlencoding::encode(mint));
        let request = self.transport.request(&self.config, url);

        self.transport.fetch_json(self.id(), request).await
    }
}

impl PriceSource for JupiterAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Jupiter
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn reference_price<'a>(&'a self) -> SourceFuture<'a, PriceQuote> {
        Box::pin(async move {
            let asset = &self.config.reference_asset;
            let price = self.usd_price(&asset.id).await?;
            PriceQuote::new(price, asset.name.as_str(), &asset.symbol, self.id())
                .map_err(|e| SourceError::malformed(format!("jupiter reference price: {e}")))
        })
    }

    fn token_quote<'a>(&'a self, token: &'a TokenId) -> SourceFuture<'a, PriceQuote> {
        Box::pin(async move {
            let price = self.usd_price(token.as_str()).await?;
            let metadata = self.metadata(token.as_str()).await?;
            PriceQuote::new(price, metadata.name, &metadata.symbol, self.id())
                .map_err(|e| SourceError::malformed(format!("jupiter quote for '{token}': {e}")))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    data: HashMap<String, Option<PriceEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
struct PriceEntry {
    price: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenMetadata {
    #[serde(default)]
    name: String,
    symbol: String,
}
