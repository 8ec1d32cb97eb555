// =============================================================================
// Historical Bar Index
// =============================================================================
//
// Read-only, in-memory index of daily bars per symbol. Built once per process
// (from a directory of `<SYMBOL>.json` files or directly from series) and then
// shared across runs behind an `Arc`.
//
// File format: a JSON array of bars,
//   [{"date":"2024-03-01","open":1.0,"high":1.2,"low":0.9,"close":1.1,"volume":1000}, ...]
// Order inside a file does not matter; bars are sorted by date on load and
// duplicate dates keep the last occurrence.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::providers::HistoricalDataProvider;
use crate::types::OhlcBar;

#[derive(Debug, Clone, Default)]
pub struct BarIndex {
    series: HashMap<String, Vec<OhlcBar>>,
}

impl BarIndex {
    /// Build an index from `(symbol, bars)` pairs.
    pub fn from_series<I, S>(series: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<OhlcBar>)>,
        S: Into<String>,
    {
        let series = series
            .into_iter()
            .map(|(symbol, bars)| {
                let symbol: String = symbol.into();
                (normalize_symbol(&symbol), normalize_bars(bars))
            })
            .collect();
        Self { series }
    }

    /// Load every `*.json` file in `dir`; the file stem is the symbol.
    ///
    /// A missing or unreadable directory is fatal. A malformed file is logged
    /// and skipped so one bad symbol cannot take down the whole index.
    pub fn load_json_dir(dir: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| AnalysisError::ProviderUnavailable {
            reason: format!("cannot read data directory {}: {e}", dir.display()),
        })?;

        let mut series = HashMap::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(symbol) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<Vec<OhlcBar>>(&content).map_err(|e| e.to_string())
                });

            match parsed {
                Ok(bars) => {
                    debug!(symbol, bars = bars.len(), "loaded bar history");
                    series.insert(normalize_symbol(symbol), normalize_bars(bars));
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unreadable bar file");
                }
            }
        }

        info!(dir = %dir.display(), symbols = series.len(), "historical bar index loaded");
        Ok(Self { series })
    }

    pub fn symbol_count(&self) -> usize {
        self.series.len()
    }

    /// Up to `count` bars dated on or before `as_of`, oldest first.
    pub fn bars_as_of(&self, symbol: &str, as_of: NaiveDate, count: usize) -> Vec<OhlcBar> {
        let Some(bars) = self.series.get(&normalize_symbol(symbol)) else {
            return Vec::new();
        };
        let end = bars.partition_point(|b| b.date <= as_of);
        let start = end.saturating_sub(count);
        bars[start..end].to_vec()
    }
}

#[async_trait]
impl HistoricalDataProvider for BarIndex {
    async fn get_bars(&self, symbol: &str, as_of: NaiveDate, count: usize) -> Vec<OhlcBar> {
        self.bars_as_of(symbol, as_of, count)
    }
}

fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

fn normalize_bars(mut bars: Vec<OhlcBar>) -> Vec<OhlcBar> {
    // Stable sort, then keep the last bar of each date.
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<OhlcBar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}
