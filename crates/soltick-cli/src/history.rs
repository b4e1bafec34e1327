//! Append-only CSV price history.
//!
//! The header row is the serialized field names of [`HistoryRecord`] and is
//! written only when the file is new or empty.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use soltick_core::{ExchangeRate, Resolution};
use tracing::debug;

use crate::error::CliError;

const AUTO_NOTE: &str = "auto";

/// One recorded price observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: String,
    pub token_address: String,
    pub token_name: String,
    pub token_symbol: String,
    pub sol_price_usd: String,
    pub token_price_usd: String,
    pub sol_to_token: String,
    pub token_to_sol: String,
    pub source: String,
    pub note: String,
}

impl HistoryRecord {
    pub fn from_resolution(resolution: &Resolution, rate: ExchangeRate) -> Self {
        Self {
            timestamp: resolution.resolved_at.format_compact(),
            token_address: resolution.token.as_str().to_owned(),
            token_name: resolution.quote.name.clone(),
            token_symbol: resolution.quote.symbol.as_str().to_owned(),
            sol_price_usd: format!("{:.6}", resolution.reference_price_usd),
            token_price_usd: format!("{:.8}", resolution.quote.price_usd),
            sol_to_token: format!("{:.8}", rate.a_to_b),
            token_to_sol: format!("{:.8}", rate.b_to_a),
            source: resolution.source.as_str().to_owned(),
            note: String::from(AUTO_NOTE),
        }
    }
}

/// CSV file holding [`HistoryRecord`]s.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Append rows, creating the file and its header on first write.
    pub fn append(&self, records: &[HistoryRecord]) -> Result<(), CliError> {
        if records.is_empty() {
            return Ok(());
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let needs_header = file.metadata().map(|meta| meta.len() == 0).unwrap_or(true);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        debug!(path = %self.path.display(), rows = records.len(), "history appended");
        Ok(())
    }

    /// The last `limit` rows in file order. A missing file yields no rows.
    pub fn tail(&self, limit: usize) -> Result<Vec<HistoryRecord>, CliError> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader
            .deserialize::<HistoryRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        let skip = records.len().saturating_sub(limit);

        Ok(records.into_iter().skip(skip).collect())
    }
}
