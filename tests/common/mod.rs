//! Shared fixtures for the soltick integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use soltick_core::{
    HttpClient, HttpError, HttpRequest, HttpResponse, PriceQuote, PriceSource, ProviderConfig,
    ProviderId, SourceError, SourceFuture, TokenId,
};

pub const SOL_MINT: &str = "So11111111111111111111111111111111111111112";
pub const ABC_MINT: &str = "ABCdefGhiJKLmnoPQRstuVWXyz111111111111111111";

/// HTTP transport replaying canned responses by URL fragment.
#[derive(Debug, Default)]
pub struct ScriptedHttp {
    routes: Mutex<Vec<(String, VecDeque<Result<HttpResponse, HttpError>>)>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(self, fragment: &str, response: HttpResponse) -> Self {
        self.push(fragment, Ok(response));
        self
    }

    pub fn on_error(self, fragment: &str, error: HttpError) -> Self {
        self.push(fragment, Err(error));
        self
    }

    fn push(&self, fragment: &str, result: Result<HttpResponse, HttpError>) {
        let mut routes = self.routes.lock().expect("routes lock");
        match routes.iter_mut().find(|(key, _)| key == fragment) {
            Some((_, queue)) => queue.push_back(result),
            None => routes.push((fragment.to_owned(), VecDeque::from([result]))),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn hits(&self, fragment: &str) -> usize {
        self.urls().iter().filter(|url| url.contains(fragment)).count()
    }
}

impl HttpClient for ScriptedHttp {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let result = {
            let mut routes = self.routes.lock().expect("routes lock");
            routes
                .iter_mut()
                .find(|(fragment, _)| request.url.contains(fragment.as_str()))
                .and_then(|(_, queue)| {
                    if queue.len() > 1 {
                        queue.pop_front()
                    } else {
                        queue.front().cloned()
                    }
                })
                .unwrap_or_else(|| Ok(HttpResponse::with_status(404, "")))
        };
        self.requests.lock().expect("requests lock").push(request.url);
        Box::pin(async move { result })
    }
}

/// In-memory provider returning fixed outcomes and counting calls.
pub struct FakeSource {
    config: ProviderConfig,
    reference: Result<f64, SourceError>,
    quote: Result<(f64, &'static str, &'static str), SourceError>,
    pub reference_calls: AtomicUsize,
    pub quote_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(id: ProviderId) -> Self {
        Self {
            config: ProviderConfig::default_for(id),
            reference: Err(SourceError::transient("reference unavailable")),
            quote: Err(SourceError::not_found("token unknown")),
            reference_calls: AtomicUsize::new(0),
            quote_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_reference(mut self, price: f64) -> Self {
        self.reference = Ok(price);
        self
    }

    pub fn with_quote(mut self, price: f64, name: &'static str, symbol: &'static str) -> Self {
        self.quote = Ok((price, name, symbol));
        self
    }

    pub fn failing_quote(mut self, error: SourceError) -> Self {
        self.quote = Err(error);
        self
    }

    pub fn calls(&self) -> usize {
        self.reference_calls.load(Ordering::SeqCst) + self.quote_calls.load(Ordering::SeqCst)
    }
}

impl PriceSource for FakeSource {
    fn id(&self) -> ProviderId {
        self.config.id
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn reference_price<'a>(&'a self) -> SourceFuture<'a, PriceQuote> {
        self.reference_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.reference.clone().and_then(|price| {
            PriceQuote::new(price, "Solana", "SOL", self.config.id)
                .map_err(|e| SourceError::malformed(e.to_string()))
        });
        Box::pin(async move { result })
    }

    fn token_quote<'a>(&'a self, _token: &'a TokenId) -> SourceFuture<'a, PriceQuote> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        let result = self.quote.clone().and_then(|(price, name, symbol)| {
            PriceQuote::new(price, name, symbol, self.config.id)
                .map_err(|e| SourceError::malformed(e.to_string()))
        });
        Box::pin(async move { result })
    }
}

/// Keep a typed handle while handing the resolver a trait object.
pub fn shared(source: FakeSource) -> (Arc<FakeSource>, Arc<dyn PriceSource>) {
    let typed = Arc::new(source);
    let erased: Arc<dyn PriceSource> = typed.clone();
    (typed, erased)
}

pub fn jupiter_price_body(mint: &str, price: &str) -> String {
    format!(
        r#"{{"data":{{"{mint}":{{"id":"{mint}","type":"derivedPrice","price":"{price}"}}}},"timeTaken":0.001}}"#
    )
}

pub fn jupiter_missing_body(mint: &str) -> String {
    format!(r#"{{"data":{{"{mint}":null}},"timeTaken":0.001}}"#)
}

pub fn dexscreener_pairs_body(base: &str, symbol: &str, price: &str, liquidity: f64) -> String {
    format!(
        r#"{{"schemaVersion":"1.0.0","pairs":[{{"pairAddress":"pair-1","baseToken":{{"address":"{base}","name":"{symbol} Token","symbol":"{symbol}"}},"quoteToken":{{"address":"{SOL_MINT}","name":"Wrapped SOL","symbol":"SOL"}},"priceUsd":"{price}","liquidity":{{"usd":{liquidity}}}}}]}}"#
    )
}

pub fn coingecko_catalog_body() -> String {
    format!(
        r#"[{{"id":"solana","symbol":"sol","name":"Solana","platforms":{{}}}},{{"id":"abc-token","symbol":"abc","name":"ABC Token","platforms":{{"solana":"{ABC_MINT}"}}}}]"#
    )
}
