//! # Soltick Core
//!
//! Multi-source USD price resolution for Solana tokens.
//!
//! ## Overview
//!
//! This crate provides the building blocks behind the `soltick` CLI:
//!
//! - **Domain types** for token ids, symbols, quotes and exchange rates
//! - **Provider adapters** for Jupiter, DEX Screener and CoinGecko
//! - **Retry policy** with exponential backoff for upstream calls
//! - **TTL cache** for the expensive CoinGecko catalog lookup
//! - **Resolver** that walks an ordered provider list until both the SOL
//!   reference price and the token quote are known
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Jupiter, DEX Screener, CoinGecko) |
//! | [`cache`] | In-memory TTL cache |
//! | [`config`] | Provider descriptors and runtime configuration |
//! | [`data_source`] | `PriceSource` trait and error taxonomy |
//! | [`domain`] | Domain models (TokenId, PriceQuote, ExchangeRate) |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`resolver`] | Provider fallback and resolution outcomes |
//! | [`retry`] | Bounded retry with backoff |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use soltick_core::{CoreConfig, PriceResolverBuilder, TokenId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CoreConfig::from_env()?;
//!     let resolver = PriceResolverBuilder::from_config(&config).build();
//!
//!     let token = TokenId::parse("JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN")?;
//!     let resolution = resolver.resolve(&token, &config.providers).await?;
//!     let rate = resolution.rate()?;
//!
//!     println!("1 SOL = {:.6} {}", rate.a_to_b, resolution.quote.symbol);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  PriceResolver  │────▶│ calculate_rate   │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ PriceSource     │────▶│ CacheStore       │
//! │ (Adapter Trait) │     │ (CoinGecko only) │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ RetryPolicy     │────▶│ HTTP Client      │
//! └─────────────────┘     │ (reqwest)        │
//!                         └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Adapters classify every failure into a [`SourceError`]. The resolver
//! treats them uniformly and reports a [`ResolutionFailure`] once the provider
//! list is exhausted:
//!
//! ```rust
//! use soltick_core::{ResolutionFailure, ResolutionFailureKind};
//!
//! fn explain(failure: &ResolutionFailure) -> &'static str {
//!     match failure.kind {
//!         ResolutionFailureKind::NoTokenQuote => "check the mint address",
//!         ResolutionFailureKind::NoReferencePrice
//!         | ResolutionFailureKind::AllProvidersExhausted => failure.hint(),
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are read from environment variables only and sent as headers
//! - Request URLs are logged; headers never are
//! - All HTTP requests use TLS via rustls

pub mod adapters;
pub mod cache;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod resolver;
pub mod retry;
pub mod source;

// Adapter implementations
pub use adapters::{CoingeckoAdapter, DexscreenerAdapter, JupiterAdapter, Transport};

// Caching
pub use cache::{CacheStore, DEFAULT_TTL};

// Configuration
pub use config::{CoreConfig, ProviderConfig, RateLimitHint, ReferenceAsset, WRAPPED_SOL_MINT};

// Price source trait and errors
pub use data_source::{PriceSource, SourceError, SourceErrorKind, SourceFuture};

// Domain models
pub use domain::{
    calculate_rate, parse_decimal_price, ExchangeRate, PriceQuote, TokenId, TokenSymbol,
    UtcDateTime,
};

// Error types
pub use error::{CoreError, RateError, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Resolution
pub use resolver::{
    Comparison, PriceResolver, PriceResolverBuilder, ProviderFailure, Resolution,
    ResolutionFailure, ResolutionFailureKind, ResolutionOutcome, ResolutionState,
};

// Retry logic
pub use retry::{Backoff, RetryPolicy};

// Source identifiers
pub use source::ProviderId;
