//! Rendering of resolution results and history rows.

use std::io::Write;

use serde::Serialize;
use soltick_core::{ProviderId, Resolution, ResolutionFailure, TokenId};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::history::HistoryRecord;

/// Outcome of one requested token, ready for display.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TokenReport {
    Resolved(ResolvedView),
    Failed(FailedView),
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedView {
    pub token: String,
    pub name: String,
    pub symbol: String,
    pub reference_symbol: String,
    pub sol_price_usd: f64,
    pub token_price_usd: f64,
    pub sol_to_token: f64,
    pub token_to_sol: f64,
    pub source: ProviderId,
    pub source_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub latency_ms: u64,
    pub resolved_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedView {
    pub token: String,
    pub kind: String,
    pub hint: String,
    pub source_chain: Vec<ProviderId>,
    pub errors: Vec<ErrorView>,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub provider: ProviderId,
    pub code: String,
    pub message: String,
}

impl TokenReport {
    pub fn resolved(resolution: &Resolution, sol_to_token: f64, token_to_sol: f64) -> Self {
        Self::Resolved(ResolvedView {
            token: resolution.token.to_string(),
            name: resolution.quote.name.clone(),
            symbol: resolution.quote.symbol.to_string(),
            reference_symbol: resolution.reference_symbol.to_string(),
            sol_price_usd: resolution.reference_price_usd,
            token_price_usd: resolution.quote.price_usd,
            sol_to_token,
            token_to_sol,
            source: resolution.source,
            source_chain: resolution.source_chain.clone(),
            warnings: resolution.warnings.clone(),
            latency_ms: resolution.latency_ms,
            resolved_at: resolution.resolved_at.format_rfc3339(),
        })
    }

    pub fn failed(token: &TokenId, failure: &ResolutionFailure) -> Self {
        Self::Failed(FailedView {
            token: token.to_string(),
            kind: failure.kind.to_string(),
            hint: failure.hint().to_owned(),
            source_chain: failure.source_chain.clone(),
            errors: failure
                .errors
                .iter()
                .map(|failed| ErrorView {
                    provider: failed.provider,
                    code: failed.error.code().to_owned(),
                    message: failed.error.message().to_owned(),
                })
                .collect(),
            latency_ms: failure.latency_ms,
        })
    }
}

pub fn render_reports(
    out: &mut impl Write,
    reports: &[TokenReport],
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, reports)?;
            writeln!(out)?;
        }
        OutputFormat::Table => {
            for (index, report) in reports.iter().enumerate() {
                if index > 0 {
                    writeln!(out)?;
                }
                match report {
                    TokenReport::Resolved(view) => write_resolved(out, view)?,
                    TokenReport::Failed(view) => write_failed(out, view)?,
                }
            }
        }
    }
    Ok(())
}

fn write_resolved(out: &mut impl Write, view: &ResolvedView) -> Result<(), CliError> {
    let rule = "=".repeat(50);
    writeln!(out, "{} ({}) {}", view.name, view.symbol, view.token)?;
    writeln!(out, "  {} price:   ${:.6}", view.reference_symbol, view.sol_price_usd)?;
    writeln!(out, "  {} price:   ${:.8}", view.symbol, view.token_price_usd)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "1 {} = {:.8} {}", view.reference_symbol, view.sol_to_token, view.symbol)?;
    writeln!(out, "1 {} = {:.8} {}", view.symbol, view.token_to_sol, view.reference_symbol)?;
    writeln!(out, "{rule}")?;
    writeln!(
        out,
        "source: {} (tried {}) in {} ms",
        view.source,
        join_chain(&view.source_chain),
        view.latency_ms
    )?;
    for warning in &view.warnings {
        writeln!(out, "warning: {warning}")?;
    }
    Ok(())
}

fn write_failed(out: &mut impl Write, view: &FailedView) -> Result<(), CliError> {
    writeln!(out, "failed to price {}: {}", view.token, view.kind)?;
    for error in &view.errors {
        writeln!(out, "  {}: {} ({})", error.provider, error.message, error.code)?;
    }
    writeln!(out, "hint: {}", view.hint)?;
    Ok(())
}

fn join_chain(chain: &[ProviderId]) -> String {
    chain
        .iter()
        .map(|provider| provider.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub fn render_history(
    out: &mut impl Write,
    records: &[HistoryRecord],
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, records)?;
            writeln!(out)?;
        }
        OutputFormat::Table => {
            writeln!(
                out,
                "timestamp\ttoken_address\ttoken_name\ttoken_symbol\tsol_price_usd\ttoken_price_usd\tsol_to_token\ttoken_to_sol\tsource\tnote"
            )?;
            writeln!(out, "{}", "-".repeat(100))?;
            for record in records {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    record.timestamp,
                    record.token_address,
                    record.token_name,
                    record.token_symbol,
                    record.sol_price_usd,
                    record.token_price_usd,
                    record.sol_to_token,
                    record.token_to_sol,
                    record.source,
                    record.note
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved_view() -> TokenReport {
        TokenReport::Resolved(ResolvedView {
            token: String::from("AbcMint"),
            name: String::from("ABC Token"),
            symbol: String::from("ABC"),
            reference_symbol: String::from("SOL"),
            sol_price_usd: 100.0,
            token_price_usd: 25.0,
            sol_to_token: 4.0,
            token_to_sol: 0.25,
            source: ProviderId::Jupiter,
            source_chain: vec![ProviderId::Jupiter],
            warnings: Vec::new(),
            latency_ms: 12,
            resolved_at: String::from("2025-01-02T03:04:05Z"),
        })
    }

    #[test]
    fn table_prints_both_ratios() {
        let mut out = Vec::new();
        render_reports(&mut out, &[resolved_view()], OutputFormat::Table).expect("rendered");
        let text = String::from_utf8(out).expect("utf8");

        assert!(text.contains("1 SOL = 4.00000000 ABC"));
        assert!(text.contains("1 ABC = 0.25000000 SOL"));
        assert!(text.contains("source: jupiter (tried jupiter)"));
    }

    #[test]
    fn json_tags_each_report_with_its_status() {
        let failed = TokenReport::Failed(FailedView {
            token: String::from("deadbeef"),
            kind: String::from("all_providers_exhausted"),
            hint: String::from("check connectivity"),
            source_chain: vec![ProviderId::Jupiter, ProviderId::Coingecko],
            errors: vec![ErrorView {
                provider: ProviderId::Jupiter,
                code: String::from("source.not_found"),
                message: String::from("jupiter has no price for 'deadbeef'"),
            }],
            latency_ms: 3,
        });

        let mut out = Vec::new();
        render_reports(&mut out, &[resolved_view(), failed], OutputFormat::Json)
            .expect("rendered");
        let value: serde_json::Value = serde_json::from_slice(&out).expect("valid json");

        assert_eq!(value[0]["status"], "resolved");
        assert_eq!(value[0]["source"], "jupiter");
        assert_eq!(value[1]["status"], "failed");
        assert_eq!(value[1]["errors"][0]["code"], "source.not_found");
    }
}
