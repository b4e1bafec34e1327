use serde::Deserialize;
use tracing::debug;

use super::Transport;
use crate::data_source::{PriceSource, SourceError, SourceFuture};
use crate::{parse_decimal_price, PriceQuote, ProviderConfig, ProviderId, TokenId};

/// DEX Screener adapter.
///
/// A token may trade in many pairs. The quote comes from the pair with the
/// deepest USD liquidity among pairs whose base token is the requested token.
#[derive(Clone)]
pub struct DexscreenerAdapter {
    config: ProviderConfig,
    transport: Transport,
}

impl DexscreenerAdapter {
    pub fn new(config: ProviderConfig, transport: Transport) -> Self {
        Self { config, transport }
    }

    async fn quote_for(&self, address: &str) -> Result<PriceQuote, SourceError> {
        let url = format!(
            "{}/latest/dex/tokens/{}",
            self.config.base_url,
            urlencoding::encode(address)
        );
        let request = self.transport.request(&self.config, url);
        let response: TokenPairsResponse = self.transport.fetch_json(self.id(), request).await?;
        let pairs = response.pairs.unwrap_or_default();

        let pair = select_best_pair(&pairs, address).ok_or_else(|| {
            SourceError::not_found(format!("dexscreener lists no pairs for '{address}'"))
        })?;
        debug!(
            address,
            pair = pair.pair_address.as_deref().unwrap_or("-"),
            liquidity_usd = pair.liquidity_usd(),
            "selected dexscreener pair"
        );

        let raw_price = pair.price_usd.as_deref().ok_or_else(|| {
            SourceError::malformed(format!("dexscreener pair for '{address}' lacks 'priceUsd'"))
        })?;
        let price = parse_decimal_price("priceUsd", raw_price)
            .map_err(|e| SourceError::malformed(format!("dexscreener priceUsd: {e}")))?;

        PriceQuote::new(
            price,
            pair.base_token.name.as_str(),
            &pair.base_token.symbol,
            self.id(),
        )
        .map_err(|e| SourceError::malformed(format!("dexscreener quote for '{address}': {e}")))
    }
}

impl PriceSource for DexscreenerAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Dexscreener
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn reference_price<'a>(&'a self) -> SourceFuture<'a, PriceQuote> {
        Box::pin(async move { self.quote_for(&self.config.reference_asset.id).await })
    }

    fn token_quote<'a>(&'a self, token: &'a TokenId) -> SourceFuture<'a, PriceQuote> {
        Box::pin(async move { self.quote_for(token.as_str()).await })
    }
}

/// Highest `liquidity.usd` among pairs based on `address`; ties keep the
/// earliest pair and missing liquidity counts as zero.
fn select_best_pair<'p>(pairs: &'p [DexPair], address: &str) -> Option<&'p DexPair> {
    pairs
        .iter()
        .filter(|pair| pair.base_token.address.eq_ignore_ascii_case(address))
        .fold(None, |best: Option<&DexPair>, pair| match best {
            Some(current) if current.liquidity_usd() >= pair.liquidity_usd() => Some(current),
            _ => Some(pair),
        })
}

#[derive(Debug, Clone, Deserialize)]
struct TokenPairsResponse {
    pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Clone, Deserialize)]
struct DexPair {
    #[serde(rename = "pairAddress")]
    pair_address: Option<String>,
    #[serde(rename = "baseToken")]
    base_token: DexToken,
    #[serde(rename = "priceUsd")]
    price_usd: Option<String>,
    liquidity: Option<DexLiquidity>,
}

impl DexPair {
    fn liquidity_usd(&self) -> f64 {
        self.liquidity
            .as_ref()
            .and_then(|liquidity| liquidity.usd)
            .filter(|usd| usd.is_finite())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DexToken {
    address: String,
    #[serde(default)]
    name: String,
    symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DexLiquidity {
    usd: Option<f64>,
}
