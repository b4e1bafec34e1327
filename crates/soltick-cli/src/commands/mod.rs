mod history;
mod resolve;

use std::io;
use std::process::ExitCode;

use soltick_core::CoreConfig;

use crate::cli::Cli;
use crate::error::CliError;

/// Exit code when at least one token could not be priced.
pub const EXIT_PARTIAL_FAILURE: u8 = 3;

pub async fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(limit) = cli.history_limit() {
        return history::run(cli, limit, &mut out);
    }

    let config = CoreConfig::from_env()?;
    resolve::run(cli, &config, &mut out).await
}
