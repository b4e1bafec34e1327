use std::env;
use std::io::Write;
use std::process::ExitCode;

use soltick_core::{
    CoreConfig, CoreError, PriceResolverBuilder, ProviderId, ResolutionOutcome, TokenId,
};
use tracing::info;

use super::EXIT_PARTIAL_FAILURE;
use crate::cli::{Cli, OutputFormat};
use crate::error::CliError;
use crate::history::{HistoryRecord, HistoryStore};
use crate::output::{render_reports, TokenReport};

const DEFAULT_TOKEN_VAR: &str = "DEFAULT_TOKEN_ADDRESS";

pub async fn run(
    cli: &Cli,
    config: &CoreConfig,
    out: &mut impl Write,
) -> Result<ExitCode, CliError> {
    let raw_tokens = requested_tokens(&cli.tokens, env::var(DEFAULT_TOKEN_VAR).ok())?;
    let tokens = raw_tokens
        .iter()
        .map(|raw| TokenId::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;
    let chain = match &cli.providers {
        Some(list) => ProviderId::parse_list(list)?,
        None => config.providers.clone(),
    };

    info!(tokens = tokens.len(), chain = ?chain, "resolving token prices");
    let resolver = PriceResolverBuilder::from_config(config).build();
    let outcomes = resolver.resolve_many(&tokens, &chain).await;

    let summary = summarize(&tokens, outcomes)?;
    render_reports(out, &summary.reports, cli.format)?;

    if !cli.no_save && !summary.records.is_empty() {
        let store = HistoryStore::new(&cli.history_file);
        store.append(&summary.records)?;
        if cli.format == OutputFormat::Table {
            writeln!(
                out,
                "\nsaved {} row(s) to {}",
                summary.records.len(),
                store.path().display()
            )?;
        }
    }

    if summary.failed > 0 {
        return Ok(ExitCode::from(EXIT_PARTIAL_FAILURE));
    }
    Ok(ExitCode::SUCCESS)
}

/// Command-line tokens, or the configured default when none were given.
fn requested_tokens(args: &[String], default: Option<String>) -> Result<Vec<String>, CliError> {
    if !args.is_empty() {
        return Ok(args.to_vec());
    }

    match default.map(|value| value.trim().to_owned()) {
        Some(token) if !token.is_empty() => {
            info!(token = %token, "using {DEFAULT_TOKEN_VAR}");
            Ok(vec![token])
        }
        _ => Err(CliError::MissingToken),
    }
}

#[derive(Debug, Default)]
struct Summary {
    reports: Vec<TokenReport>,
    records: Vec<HistoryRecord>,
    failed: usize,
}

fn summarize(tokens: &[TokenId], outcomes: Vec<ResolutionOutcome>) -> Result<Summary, CliError> {
    let mut summary = Summary::default();

    for (token, outcome) in tokens.iter().zip(outcomes) {
        match outcome {
            Ok(resolution) => {
                let rate = resolution.rate().map_err(CoreError::from)?;
                summary
                    .reports
                    .push(TokenReport::resolved(&resolution, rate.a_to_b, rate.b_to_a));
                summary
                    .records
                    .push(HistoryRecord::from_resolution(&resolution, rate));
            }
            Err(failure) => {
                summary.failed += 1;
                summary.reports.push(TokenReport::failed(token, &failure));
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use soltick_core::{
        PriceQuote, Resolution, ResolutionFailure, ResolutionFailureKind, ResolutionState,
        TokenSymbol, UtcDateTime,
    };

    fn resolution(token: &TokenId) -> Resolution {
        Resolution {
            token: token.clone(),
            reference_price_usd: 100.0,
            reference_symbol: TokenSymbol::parse("SOL").expect("valid symbol"),
            quote: PriceQuote::new(25.0, "ABC Token", "abc", ProviderId::Jupiter)
                .expect("valid quote"),
            source: ProviderId::Jupiter,
            source_chain: vec![ProviderId::Jupiter],
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 5,
            resolved_at: UtcDateTime::parse("2025-01-02T03:04:05Z").expect("valid time"),
        }
    }

    fn failure(token: &TokenId) -> ResolutionFailure {
        ResolutionFailure {
            kind: ResolutionFailureKind::AllProvidersExhausted,
            token: token.clone(),
            reached: ResolutionState::Pending,
            source_chain: vec![ProviderId::Jupiter],
            errors: Vec::new(),
            latency_ms: 5,
        }
    }

    #[test]
    fn explicit_tokens_win_over_the_default() {
        let tokens = requested_tokens(&[String::from("MintA")], Some(String::from("MintB")))
            .expect("tokens");
        assert_eq!(tokens, vec!["MintA"]);
    }

    #[test]
    fn default_token_is_used_when_none_given() {
        let tokens = requested_tokens(&[], Some(String::from(" MintB "))).expect("tokens");
        assert_eq!(tokens, vec!["MintB"]);
    }

    #[test]
    fn missing_token_is_a_usage_error() {
        let error = requested_tokens(&[], Some(String::from("  "))).expect_err("no token");
        assert!(matches!(error, CliError::MissingToken));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn summary_records_successes_and_counts_failures() {
        let good = TokenId::parse("AbcMint").expect("valid token");
        let bad = TokenId::parse("deadbeef").expect("valid token");

        let summary = summarize(
            &[good.clone(), bad.clone()],
            vec![Ok(resolution(&good)), Err(failure(&bad))],
        )
        .expect("summary");

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.records.len(), 1);

        let record = &summary.records[0];
        assert_eq!(record.timestamp, "2025-01-02 03:04:05");
        assert_eq!(record.token_symbol, "ABC");
        assert_eq!(record.sol_price_usd, "100.000000");
        assert_eq!(record.token_price_usd, "25.00000000");
        assert_eq!(record.sol_to_token, "4.00000000");
        assert_eq!(record.token_to_sol, "0.25000000");
        assert_eq!(record.source, "jupiter");
    }
}
