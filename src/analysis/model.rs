// =============================================================================
// Analysis result model
// =============================================================================
//
// StageResult   — one per (symbol, stage); immutable once produced.
// StockRecord   — fixed-shape per-symbol record filled stage by stage.
// AnalysisResult — the aggregated per-symbol row handed to the result sink.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{clamp_score, Crossover, Direction, TrendStrength, NEUTRAL_SCORE};
use crate::types::Candidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RelativeStrength,
    Volatility,
    Momentum,
    Trend,
}

impl Stage {
    /// Stages in execution order.
    pub const ALL: [Stage; 4] = [
        Stage::RelativeStrength,
        Stage::Volatility,
        Stage::Momentum,
        Stage::Trend,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeStrength => write!(f, "relative_strength"),
            Self::Volatility => write!(f, "volatility"),
            Self::Momentum => write!(f, "momentum"),
            Self::Trend => write!(f, "trend"),
        }
    }
}

/// Stage-specific raw values behind a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageDetail {
    RelativeStrength {
        stock_return: f64,
        index_return: f64,
        excess_return: f64,
    },
    Volatility {
        atr: f64,
        atr_ratio: f64,
        bb_width: f64,
        /// 0..1 fraction.
        bb_position: f64,
    },
    /// Short history: scored from the last close-to-close move only.
    VolatilityFallback { return_magnitude: Option<f64> },
    Momentum {
        sma_short: f64,
        sma_long: f64,
        crossover: Crossover,
        /// `None` when history is too short for the MACD signal line.
        macd_histogram: Option<f64>,
    },
    Trend {
        adx: f64,
        strength: TrendStrength,
    },
}

/// Output of one stage for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub stage: Stage,
    pub score: u8,
    pub detail: Option<StageDetail>,
    /// Why a neutral default was used instead of a computed score.
    pub defaulted: Option<String>,
}

/// Per-symbol record the orchestrator fills one stage at a time.
#[derive(Debug, Clone)]
pub struct StockRecord {
    pub candidate: Candidate,
    pub current_price: Option<f64>,
    stages: [Option<StageResult>; 4],
}

impl StockRecord {
    pub fn new(candidate: Candidate) -> Self {
        Self {
            candidate,
            current_price: None,
            stages: Default::default(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.candidate.symbol
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageResult> {
        self.stages[stage.slot()].as_ref()
    }

    /// Record a finite price observed while fetching history.
    pub fn observe_price(&mut self, price: Option<f64>) {
        if let Some(p) = price.filter(|p| p.is_finite()) {
            self.current_price = Some(p);
        }
    }

    pub fn set_scored(&mut self, stage: Stage, score: u8, detail: StageDetail) {
        self.stages[stage.slot()] = Some(self.stage_result(stage, score, Some(detail), None));
    }

    pub fn set_defaulted(&mut self, stage: Stage, reason: impl Into<String>) {
        self.stages[stage.slot()] =
            Some(self.stage_result(stage, NEUTRAL_SCORE, None, Some(reason.into())));
    }

    fn stage_result(
        &self,
        stage: Stage,
        score: u8,
        detail: Option<StageDetail>,
        defaulted: Option<String>,
    ) -> StageResult {
        StageResult {
            symbol: self.candidate.symbol.clone(),
            name: self.candidate.name.clone(),
            current_price: self.current_price,
            stage,
            score,
            detail,
            defaulted,
        }
    }

    /// Aggregate into the final row. Empty or defaulted stages count as 50.
    pub fn finish(
        self,
        direction: Direction,
        analysis_date: NaiveDate,
        calculation_date: DateTime<Utc>,
    ) -> AnalysisResult {
        let mut scores = [NEUTRAL_SCORE; 4];
        let mut defaulted_stages = Vec::new();
        let mut crossover = None;
        let mut trend_strength = None;

        for stage in Stage::ALL {
            match self.stage(stage) {
                Some(result) => {
                    scores[stage.slot()] = result.score;
                    if result.defaulted.is_some() {
                        defaulted_stages.push(stage);
                    }
                    match &result.detail {
                        Some(StageDetail::Momentum { crossover: c, .. }) => crossover = Some(*c),
                        Some(StageDetail::Trend { strength, .. }) => {
                            trend_strength = Some(*strength)
                        }
                        _ => {}
                    }
                }
                None => defaulted_stages.push(stage),
            }
        }

        let mean = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;

        AnalysisResult {
            symbol: self.candidate.symbol,
            name: self.candidate.name,
            current_price: self.current_price,
            direction,
            relative_strength_score: scores[Stage::RelativeStrength.slot()],
            volatility_score: scores[Stage::Volatility.slot()],
            momentum_score: scores[Stage::Momentum.slot()],
            trend_score: scores[Stage::Trend.slot()],
            final_score: clamp_score(mean),
            crossover,
            trend_strength,
            defaulted_stages,
            analysis_date,
            calculation_date,
        }
    }
}

/// Aggregated per-symbol result for one analysis date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub name: String,
    pub current_price: Option<f64>,
    pub direction: Direction,
    pub relative_strength_score: u8,
    pub volatility_score: u8,
    pub momentum_score: u8,
    pub trend_score: u8,
    /// `round(mean(four stage scores))`.
    pub final_score: u8,
    #[serde(default)]
    pub crossover: Option<Crossover>,
    #[serde(default)]
    pub trend_strength: Option<TrendStrength>,
    /// Stages that contributed the neutral 50 instead of a computed score.
    #[serde(default)]
    pub defaulted_stages: Vec<Stage>,
    pub analysis_date: NaiveDate,
    pub calculation_date: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn stage_scores(&self) -> [u8; 4] {
        [
            self.relative_strength_score,
            self.volatility_score,
            self.momentum_score,
            self.trend_score,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::day;

    fn no_trend() -> StageDetail {
        StageDetail::Trend {
            adx: 15.0,
            strength: TrendStrength::NoTrend,
        }
    }

    fn record() -> StockRecord {
        StockRecord::new(Candidate::new("ABC", "Abc Corp"))
    }

    #[test]
    fn final_score_is_rounded_mean() {
        let mut r = record();
        r.set_scored(
            Stage::RelativeStrength,
            95,
            StageDetail::RelativeStrength {
                stock_return: -10.0,
                index_return: 2.0,
                excess_return: -12.0,
            },
        );
        r.set_scored(
            Stage::Volatility,
            70,
            StageDetail::VolatilityFallback {
                return_magnitude: Some(0.5),
            },
        );
        r.set_scored(
            Stage::Momentum,
            75,
            StageDetail::Momentum {
                sma_short: 1.0,
                sma_long: 2.0,
                crossover: Crossover::Bearish,
                macd_histogram: Some(0.0),
            },
        );
        r.set_scored(Stage::Trend, 85, no_trend());

        let result = r.finish(Direction::Short, day(0), Utc::now());
        // (95 + 70 + 75 + 85) / 4 = 81.25
        assert_eq!(result.final_score, 81);
        assert_eq!(result.stage_scores(), [95, 70, 75, 85]);
        assert_eq!(result.crossover, Some(Crossover::Bearish));
        assert_eq!(result.trend_strength, Some(TrendStrength::NoTrend));
        assert!(result.defaulted_stages.is_empty());
    }

    #[test]
    fn missing_stages_count_as_neutral() {
        let mut r = record();
        r.set_scored(Stage::Trend, 85, no_trend());
        r.set_defaulted(Stage::Volatility, "no history");

        let result = r.finish(Direction::Short, day(0), Utc::now());
        // (50 + 50 + 50 + 85) / 4 = 58.75
        assert_eq!(result.final_score, 59);
        assert_eq!(
            result.defaulted_stages,
            vec![Stage::RelativeStrength, Stage::Volatility, Stage::Momentum]
        );
    }

    #[test]
    fn price_observation_ignores_non_finite() {
        let mut r = record();
        r.observe_price(Some(12.5));
        r.observe_price(Some(f64::NAN));
        r.observe_price(None);
        assert_eq!(r.current_price, Some(12.5));
    }

    #[test]
    fn stage_result_carries_record_identity() {
        let mut r = record();
        r.observe_price(Some(3.0));
        r.set_defaulted(Stage::Momentum, "short history");
        let stage = r.stage(Stage::Momentum).unwrap();
        assert_eq!(stage.symbol, "ABC");
        assert_eq!(stage.current_price, Some(3.0));
        assert_eq!(stage.score, NEUTRAL_SCORE);
        assert!(stage.detail.is_none());
    }
}
