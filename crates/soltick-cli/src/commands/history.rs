use std::io::Write;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::error::CliError;
use crate::history::HistoryStore;
use crate::output::render_history;

pub fn run(cli: &Cli, limit: usize, out: &mut impl Write) -> Result<ExitCode, CliError> {
    let store = HistoryStore::new(&cli.history_file);
    if !store.exists() {
        writeln!(out, "no history file at {}", store.path().display())?;
        return Ok(ExitCode::SUCCESS);
    }

    let records = store.tail(limit)?;
    if records.is_empty() {
        writeln!(out, "no history recorded yet")?;
        return Ok(ExitCode::SUCCESS);
    }

    render_history(out, &records, cli.format)?;
    Ok(ExitCode::SUCCESS)
}
