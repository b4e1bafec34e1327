//! CLI argument definitions for soltick.
//!
//! # Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--providers` | `SOLTICK_PROVIDERS` or `jupiter,dexscreener,coingecko` | Fallback order |
//! | `--history N` | - | Print the last N history rows and exit (0 resolves as usual) |
//! | `--history-file` | `token_price_history.csv` | History CSV path |
//! | `--no-save` | `false` | Skip appending to the history file |
//! | `--format` | `table` | Output format (table, json) |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! # Price one token
//! soltick JUPyiwrYJFskUPiHa7hkeR8VUtAeFoSYbKedZNsDvCN
//!
//! # Several tokens, CoinGecko first, JSON output
//! soltick MINT_A MINT_B --providers coingecko,jupiter --format json
//!
//! # Last 20 recorded rows
//! soltick --history 20
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub const DEFAULT_HISTORY_FILE: &str = "token_price_history.csv";

/// Solana token price tracker.
///
/// Resolves the USD price of SOL and of each token from Jupiter, DEX Screener
/// and CoinGecko (first success wins), prints both exchange ratios and
/// appends the result to a CSV history file.
#[derive(Debug, Parser)]
#[command(
    name = "soltick",
    author,
    version,
    about = "Solana token price tracker",
    long_about = "soltick resolves the USD price of Solana tokens across several public \
price APIs and expresses each token against SOL.\n\
\n\
When no token is given, DEFAULT_TOKEN_ADDRESS from the environment or a .env \
file is used."
)]
pub struct Cli {
    /// Token mint addresses to price.
    #[arg(value_name = "TOKEN")]
    pub tokens: Vec<String>,

    /// Comma separated provider order, e.g. `jupiter,coingecko`.
    #[arg(long, value_name = "LIST")]
    pub providers: Option<String>,

    /// Show the last N history rows instead of resolving prices.
    #[arg(long, visible_alias = "hist", value_name = "N")]
    pub history: Option<usize>,

    /// History CSV file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_HISTORY_FILE)]
    pub history_file: PathBuf,

    /// Do not append results to the history file.
    #[arg(long, default_value_t = false)]
    pub no_save: bool,

    /// Output format for results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Emit debug logs on stderr (overridden by RUST_LOG).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    /// Rows to show for `--history`. Zero means no history view.
    pub fn history_limit(&self) -> Option<usize> {
        self.history.filter(|limit| *limit > 0)
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable text.
    Table,
    /// JSON array.
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_apply_without_arguments() {
        let cli = Cli::try_parse_from(["soltick"]).expect("valid args");

        assert!(cli.tokens.is_empty());
        assert_eq!(cli.history_file, PathBuf::from(DEFAULT_HISTORY_FILE));
        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.history.is_none());
    }

    #[test]
    fn tokens_and_flags_parse() {
        let cli = Cli::try_parse_from([
            "soltick",
            "MintA",
            "MintB",
            "--providers",
            "coingecko,jupiter",
            "--format",
            "json",
            "--no-save",
        ])
        .expect("valid args");

        assert_eq!(cli.tokens, vec!["MintA", "MintB"]);
        assert_eq!(cli.providers.as_deref(), Some("coingecko,jupiter"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.no_save);
    }

    #[test]
    fn hist_alias_is_accepted() {
        let cli = Cli::try_parse_from(["soltick", "--hist", "5"]).expect("valid args");
        assert_eq!(cli.history, Some(5));
        assert_eq!(cli.history_limit(), Some(5));
    }

    #[test]
    fn zero_history_falls_back_to_resolving() {
        let cli = Cli::try_parse_from(["soltick", "MintA", "--history", "0"]).expect("valid args");

        assert_eq!(cli.history, Some(0));
        assert_eq!(cli.history_limit(), None);
        assert_eq!(cli.tokens, vec!["MintA"]);
    }
}
