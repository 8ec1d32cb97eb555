// =============================================================================
// Analysis Parameters — immutable per-run configuration
// =============================================================================
//
// Every indicator period and window used by the stages lives here. A run takes
// one `AnalysisParams` by reference and never mutates it. All fields carry
// `#[serde(default)]` so a partial JSON block in the runtime config still
// loads.

use serde::{Deserialize, Serialize};

use crate::analysis::model::Stage;
use crate::scoring::MIN_VOLATILITY_BARS;

fn default_benchmark_symbol() -> String {
    "SPY".to_string()
}

fn default_relative_strength_lookback() -> usize {
    20
}

fn default_atr_period() -> usize {
    14
}

fn default_bb_period() -> usize {
    20
}

fn default_bb_std_dev() -> f64 {
    2.0
}

fn default_sma_short() -> usize {
    3
}

fn default_sma_long() -> usize {
    12
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_adx_period() -> usize {
    14
}

fn default_history_bars() -> usize {
    60
}

fn default_stage_concurrency() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Index the relative-strength stage compares against.
    #[serde(default = "default_benchmark_symbol")]
    pub benchmark_symbol: String,

    /// Trading days over which stock and index returns are measured.
    #[serde(default = "default_relative_strength_lookback")]
    pub relative_strength_lookback: usize,

    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    #[serde(default = "default_bb_period")]
    pub bb_period: usize,

    #[serde(default = "default_bb_std_dev")]
    pub bb_std_dev: f64,

    #[serde(default = "default_sma_short")]
    pub sma_short: usize,

    #[serde(default = "default_sma_long")]
    pub sma_long: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_adx_period")]
    pub adx_period: usize,

    /// Bars requested for the momentum stage so the EMAs have warmed up.
    #[serde(default = "default_history_bars")]
    pub history_bars: usize,

    /// Symbols evaluated concurrently within one stage. 1 = sequential.
    #[serde(default = "default_stage_concurrency")]
    pub stage_concurrency: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            benchmark_symbol: default_benchmark_symbol(),
            relative_strength_lookback: default_relative_strength_lookback(),
            atr_period: default_atr_period(),
            bb_period: default_bb_period(),
            bb_std_dev: default_bb_std_dev(),
            sma_short: default_sma_short(),
            sma_long: default_sma_long(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            adx_period: default_adx_period(),
            history_bars: default_history_bars(),
            stage_concurrency: default_stage_concurrency(),
        }
    }
}

impl AnalysisParams {
    /// Number of bars a stage asks the provider for.
    pub fn fetch_window(&self, stage: Stage) -> usize {
        match stage {
            Stage::RelativeStrength => self.relative_strength_lookback + 1,
            Stage::Volatility => (self.atr_period + 1)
                .max(self.bb_period)
                .max(MIN_VOLATILITY_BARS),
            Stage::Momentum => self
                .history_bars
                .max(self.sma_long + 1)
                .max(self.macd_slow + self.macd_signal - 1),
            Stage::Trend => self.adx_period + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_windows() {
        let p = AnalysisParams::default();
        assert_eq!(p.fetch_window(Stage::RelativeStrength), 21);
        assert_eq!(p.fetch_window(Stage::Volatility), 20);
        assert_eq!(p.fetch_window(Stage::Momentum), 60);
        assert_eq!(p.fetch_window(Stage::Trend), 15);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let p: AnalysisParams =
            serde_json::from_str(r#"{ "benchmark_symbol": "QQQ", "adx_period": 10 }"#).unwrap();
        assert_eq!(p.benchmark_symbol, "QQQ");
        assert_eq!(p.adx_period, 10);
        assert_eq!(p.sma_long, 12);
        assert_eq!(p.stage_concurrency, 1);
    }
}
