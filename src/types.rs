// =============================================================================
// Shared types used across the scoring pipeline
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily OHLCV bar. Sequences are always ordered oldest first.
///
/// The usual `high >= max(open, close) >= min(open, close) >= low` ordering is
/// assumed by the indicators but never enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl OhlcBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Extract closing prices, preserving order.
pub fn closes(bars: &[OhlcBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// One entry of the symbol universe for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

impl Candidate {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

impl std::str::FromStr for Candidate {
    type Err = std::convert::Infallible;

    /// Parse `SYMBOL` or `SYMBOL:Display Name`. The symbol is upper-cased.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, name) = match s.split_once(':') {
            Some((sym, name)) => (sym.trim().to_uppercase(), name.trim().to_string()),
            None => (s.trim().to_uppercase(), s.trim().to_uppercase()),
        };
        Ok(Self::new(symbol, name))
    }
}
