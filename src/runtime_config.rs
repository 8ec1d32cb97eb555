// =============================================================================
// Runtime Configuration — scanner settings with atomic save
// =============================================================================
//
// Everything the scanner needs to start lives here: indicator parameters,
// default run direction, data/results locations, API bind address and the
// candidate universe.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::AnalysisParams;
use crate::scoring::Direction;
use crate::types::Candidate;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_data_dir() -> PathBuf {
    PathBuf::from("data/bars")
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("data/results")
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("TSLA", "Tesla Inc."),
        Candidate::new("NVDA", "NVIDIA Corp."),
        Candidate::new("AMD", "Advanced Micro Devices"),
        Candidate::new("NFLX", "Netflix Inc."),
        Candidate::new("COIN", "Coinbase Global"),
    ]
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level runtime configuration.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Indicator periods, benchmark and stage concurrency for every run.
    #[serde(default)]
    pub analysis: AnalysisParams,

    /// Direction used when a run request does not name one.
    #[serde(default)]
    pub direction: Direction,

    /// Directory of `<SYMBOL>.json` daily bar files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory receiving one `<YYYY-MM-DD>.json` per analysis date.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_candidates")]
    pub candidates: Vec<Candidate>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisParams::default(),
            direction: Direction::default(),
            data_dir: default_data_dir(),
            results_dir: default_results_dir(),
            bind_addr: default_bind_addr(),
            candidates: default_candidates(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            candidates = config.candidates.len(),
            direction = %config.direction,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise runtime config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "runtime config saved (atomic)");
        Ok(())
    }

    /// Apply `SCOUT_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup. Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get("SCOUT_DATA_DIR") {
            self.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(dir) = get("SCOUT_RESULTS_DIR") {
            self.results_dir = PathBuf::from(dir.trim());
        }
        if let Some(addr) = get("SCOUT_BIND_ADDR") {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(symbol) = get("SCOUT_BENCHMARK") {
            self.analysis.benchmark_symbol = symbol.trim().to_uppercase();
        }
        if let Some(list) = get("SCOUT_CANDIDATES") {
            let candidates: Vec<Candidate> = list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .filter_map(|s| s.parse().ok())
                .collect();
            if candidates.is_empty() {
                warn!(value = %list, "SCOUT_CANDIDATES held no symbols; keeping configured list");
            } else {
                self.candidates = candidates;
            }
        }
    }
}
