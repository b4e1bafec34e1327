use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{decode_json, Transport};
use crate::cache::CacheStore;
use crate::data_source::{PriceSource, SourceError, SourceFuture};
use crate::{PriceQuote, ProviderConfig, ProviderId, TokenId};

const CATALOG_CACHE_KEY: &str = "coingecko:catalog:solana";
const SOLANA_PLATFORM: &str = "solana";

/// Cache key under which a resolved token lookup is stored.
pub fn token_cache_key(token: &TokenId) -> String {
    format!("coingecko:token:{}", token.normalized())
}

/// CoinGecko adapter.
///
/// Token quotes take the slow path: the full coin catalog is scanned for a
/// coin whose Solana platform address matches the token, then the coin's USD
/// price is fetched by id. The catalog index and each resolved lookup are
/// cached; failed lookups are not.
#[derive(Clone)]
pub struct CoingeckoAdapter {
    config: ProviderConfig,
    transport: Transport,
    cache: CacheStore,
}

impl CoingeckoAdapter {
    pub fn new(config: ProviderConfig, transport: Transport, cache: CacheStore) -> Self {
        Self {
            config,
            transport,
            cache,
        }
    }

    async fn usd_price(&self, coin_id: &str) -> Result<f64, SourceError> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.config.base_url,
            urlencoding::encode(coin_id)
        );
        let request = self.transport.request(&self.config, url);
        let prices: HashMap<String, SimplePrice> =
            self.transport.fetch_json(self.id(), request).await?;

        let entry = prices.get(coin_id).ok_or_else(|| {
            SourceError::not_found(format!("coingecko has no price for '{coin_id}'"))
        })?;
        entry.usd.ok_or_else(|| {
            SourceError::malformed(format!("coingecko price for '{coin_id}' lacks 'usd'"))
        })
    }

    async fn lookup_token(&self, token: &TokenId) -> Result<CatalogEntry, SourceError> {
        let key = token_cache_key(token);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(token = %token, "coingecko token lookup served from cache");
            return decode_json(self.id(), &hit);
        }

        let index = self.catalog_index().await?;
        let entry = index.get(&token.normalized()).cloned().ok_or_else(|| {
            SourceError::not_found(format!(
                "coingecko catalog has no coin on solana at '{token}'"
            ))
        })?;

        let body = serde_json::to_string(&entry)
            .map_err(|e| SourceError::malformed(format!("failed to encode catalog entry: {e}")))?;
        self.cache.put(key, body, None).await;

        Ok(entry)
    }

    /// Lowercased Solana address to coin entry, built from `/coins/list`.
    async fn catalog_index(&self) -> Result<HashMap<String, CatalogEntry>, SourceError> {
        let body = self
            .cache
            .get_or_try_insert_with(CATALOG_CACHE_KEY, || async {
                let url = format!("{}/coins/list?include_platform=true", self.config.base_url);
                let request = self.transport.request(&self.config, url);
                let coins: Vec<CatalogCoin> =
                    self.transport.fetch_json(self.id(), request).await?;
                let index = build_solana_index(coins);
                info!(coins = index.len(), "indexed coingecko solana catalog");

                serde_json::to_string(&index).map_err(|e| {
                    SourceError::malformed(format!("failed to encode catalog index: {e}"))
                })
            })
            .await?;

        decode_json(self.id(), &body)
    }
}

impl PriceSource for CoingeckoAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Coingecko
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn reference_price<'a>(&'a self) -> SourceFuture<'a, PriceQuote> {
        Box::pin(async move {
            let asset = &self.config.reference_asset;
            let price = self.usd_price(&asset.id).await?;
            PriceQuote::new(price, asset.name.as_str(), &asset.symbol, self.id())
                .map_err(|e| SourceError::malformed(format!("coingecko reference price: {e}")))
        })
    }

    fn token_quote<'a>(&'a self, token: &'a TokenId) -> SourceFuture<'a, PriceQuote> {
        Box::pin(async move {
            let entry = self.lookup_token(token).await?;
            let price = self.usd_price(&entry.id).await?;
            PriceQuote::new(price, entry.name, &entry.symbol, self.id())
                .map_err(|e| SourceError::malformed(format!("coingecko quote for '{token}': {e}")))
        })
    }
}

fn build_solana_index(coins: Vec<CatalogCoin>) -> HashMap<String, CatalogEntry> {
    let mut index = HashMap::new();
    for coin in coins {
        let address = coin
            .platforms
            .get(SOLANA_PLATFORM)
            .and_then(|address| address.as_deref())
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_ascii_lowercase);

        if let Some(address) = address {
            // First listing wins when two coins claim the same mint.
            index.entry(address).or_insert(CatalogEntry {
                id: coin.id,
                name: coin.name,
                symbol: coin.symbol,
            });
        }
    }
    index
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogCoin {
    id: String,
    symbol: String,
    name: String,
    #[serde(default)]
    platforms: HashMap<String, Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CatalogEntry {
    id: String,
    name: String,
    symbol: String,
}

#[derive(Debug, Clone, Deserialize)]
struct SimplePrice {
    usd: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::ScriptedHttpClient;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::HttpResponse;
    use crate::retry::RetryPolicy;
    use std::sync::Arc;
    use std::time::Duration;

    const MINT: &str = "AbC111111111111111111111111111111111111111";

    fn catalog_body() -> &'static str {
        r#"[
            {"id":"bitcoin","symbol":"btc","name":"Bitcoin","platforms":{}},
            {"id":"abc-token","symbol":"abc","name":"ABC Token","platforms":{"solana":"AbC111111111111111111111111111111111111111","ethereum":"0xabc"}},
            {"id":"null-platform","symbol":"np","name":"Null","platforms":{"solana":null}}
        ]"#
    }

    fn adapter(client: Arc<ScriptedHttpClient>, cache: CacheStore) -> CoingeckoAdapter {
        CoingeckoAdapter::new(
            ProviderConfig::coingecko().with_base_url("https://cg.test/api/v3"),
            Transport::new(client, RetryPolicy::fixed(3, Duration::from_millis(10))),
            cache,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn token_quote_scans_catalog_case_insensitively() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .respond("/coins/list", HttpResponse::ok_json(catalog_body()))
                .respond("ids=abc-token", HttpResponse::ok_json(r#"{"abc-token":{"usd":25.0}}"#)),
        );
        let cache = CacheStore::with_default_ttl();
        let adapter = adapter(client.clone(), cache.clone());
        let token = TokenId::parse(&MINT.to_ascii_lowercase()).expect("valid token");

        let quote = adapter.token_quote(&token).await.expect("quote");

        assert_eq!(quote.price_usd, 25.0);
        assert_eq!(quote.name, "ABC Token");
        assert_eq!(quote.symbol.as_str(), "ABC");
        assert_eq!(quote.provider, ProviderId::Coingecko);
        assert!(cache.get(&token_cache_key(&token)).await.is_some());

        let requests = client.recorded_requests();
        assert!(requests[0].url.ends_with("/coins/list?include_platform=true"));
    }

    #[tokio::test(start_paused = true)]
    async fn cached_lookup_skips_catalog_until_ttl_expires() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .respond("/coins/list", HttpResponse::ok_json(catalog_body()))
                .respond("ids=abc-token", HttpResponse::ok_json(r#"{"abc-token":{"usd":25.0}}"#)),
        );
        let adapter = adapter(client.clone(), CacheStore::new(Duration::from_secs(300)));
        let token = TokenId::parse(MINT).expect("valid token");

        adapter.token_quote(&token).await.expect("first quote");
        adapter.token_quote(&token).await.expect("second quote");
        assert_eq!(client.calls_matching("/coins/list"), 1);

        tokio::time::advance(Duration::from_secs(300)).await;
        adapter.token_quote(&token).await.expect("quote after expiry");
        assert_eq!(client.calls_matching("/coins/list"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_token_is_not_found_and_not_cached() {
        let client = Arc::new(
            ScriptedHttpClient::new().respond("/coins/list", HttpResponse::ok_json(catalog_body())),
        );
        let cache = CacheStore::with_default_ttl();
        let adapter = adapter(client.clone(), cache.clone());
        let token = TokenId::parse("deadbeef").expect("valid token");

        let error = adapter.token_quote(&token).await.expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::NotFound);
        assert!(cache.get(&token_cache_key(&token)).await.is_none());
        assert_eq!(client.calls_matching("simple/price"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reference_price_uses_configured_coin_id() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .respond("ids=solana", HttpResponse::ok_json(r#"{"solana":{"usd":100.0}}"#)),
        );
        let adapter = adapter(client, CacheStore::with_default_ttl());

        let quote = adapter.reference_price().await.expect("reference");

        assert_eq!(quote.price_usd, 100.0);
        assert_eq!(quote.symbol.as_str(), "SOL");
    }

    #[tokio::test(start_paused = true)]
    async fn missing_usd_field_is_malformed() {
        let client = Arc::new(
            ScriptedHttpClient::new()
                .respond("ids=solana", HttpResponse::ok_json(r#"{"solana":{"eur":90.0}}"#)),
        );
        let adapter = adapter(client, CacheStore::with_default_ttl());

        let error = adapter.reference_price().await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::MalformedResponse);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_catalog_is_retried_then_exhausted() {
        let client = Arc::new(
            ScriptedHttpClient::new().respond("/coins/list", HttpResponse::with_status(429, "")),
        );
        let cache = CacheStore::with_default_ttl();
        let adapter = adapter(client.clone(), cache.clone());
        let token = TokenId::parse(MINT).expect("valid token");

        let error = adapter.token_quote(&token).await.expect_err("must fail");

        assert_eq!(error.kind(), SourceErrorKind::Exhausted);
        assert_eq!(client.calls_matching("/coins/list"), 3);
        assert!(cache.is_empty().await);
    }

    #[test]
    fn index_skips_blank_and_null_platform_addresses() {
        let coins: Vec<CatalogCoin> = serde_json::from_str(
            r#"[
                {"id":"a","symbol":"a","name":"A","platforms":{"solana":""}},
                {"id":"b","symbol":"b","name":"B","platforms":{"solana":null}},
                {"id":"c","symbol":"c","name":"C"}
            ]"#,
        )
        .expect("valid catalog");

        assert!(build_solana_index(coins).is_empty());
    }
}
