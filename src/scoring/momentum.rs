// =============================================================================
// Momentum Scorer — SMA crossover + MACD histogram
// =============================================================================
//
// Short-side rule table, evaluated top to bottom (first match wins):
//
//   Bearish  hist < 0        → 95
//   Bearish  |hist| < 0.01   → 75
//   Bearish  hist > 0        → 55
//   Bullish  hist > 0        → 15
//   Bullish  |hist| < 0.01   → 25
//   Bullish  hist < 0        → 40
//   None     hist < -0.02    → 70
//   None     hist > 0.02     → 30
//   anything else            → 50
//
// The long side evaluates the same table with the crossover flipped and the
// histogram negated. Per-branch short + long sums for the same input:
//   Bearish/hist<0 ↔ Bullish/hist>0 : 95 + 15 = 110
//   near-zero histogram             : 75 + 25 = 100
//   Bearish/hist>0 ↔ Bullish/hist<0 : 55 + 40 = 95
//   None beyond ±0.02               : 70 + 30 = 100
//   neutral                         : 50 + 50 = 100

use serde::{Deserialize, Serialize};

use crate::indicators::sma;
use crate::scoring::direction::{clamp_score, Direction, NEUTRAL_SCORE};
use crate::types::OhlcBar;

/// Direction of the latest short/long SMA cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Crossover {
    Bullish,
    Bearish,
    None,
}

impl Crossover {
    pub fn flipped(self) -> Self {
        match self {
            Self::Bullish => Self::Bearish,
            Self::Bearish => Self::Bullish,
            Self::None => Self::None,
        }
    }
}

impl std::fmt::Display for Crossover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bullish => write!(f, "Bullish"),
            Self::Bearish => write!(f, "Bearish"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Short/long SMA pair at the previous and the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossoverReading {
    pub prev_short: f64,
    pub prev_long: f64,
    pub short: f64,
    pub long: f64,
    pub crossover: Crossover,
}

/// Detect a crossover of the `short_period` SMA over the `long_period` SMA
/// between the last two bars.
///
/// `None` when either SMA lacks two windows.
pub fn detect_crossover(
    bars: &[OhlcBar],
    short_period: usize,
    long_period: usize,
) -> Option<CrossoverReading> {
    let (prev_short, short) = sma::last_two(bars, short_period)?;
    let (prev_long, long) = sma::last_two(bars, long_period)?;

    let crossover = if prev_short <= prev_long && short > long {
        Crossover::Bullish
    } else if prev_short >= prev_long && short < long {
        Crossover::Bearish
    } else {
        Crossover::None
    };

    Some(CrossoverReading {
        prev_short,
        prev_long,
        short,
        long,
        crossover,
    })
}

const NEAR_ZERO: f64 = 0.01;
const DRIFT: f64 = 0.02;

#[derive(Debug, Clone, Copy)]
enum HistogramRule {
    Negative,
    NearZero,
    Positive,
    Below(f64),
    Above(f64),
}

impl HistogramRule {
    fn matches(self, hist: f64) -> bool {
        match self {
            Self::Negative => hist < 0.0,
            Self::NearZero => hist.abs() < NEAR_ZERO,
            Self::Positive => hist > 0.0,
            Self::Below(limit) => hist < limit,
            Self::Above(limit) => hist > limit,
        }
    }
}

struct MomentumRule {
    crossover: Crossover,
    histogram: HistogramRule,
    short_score: u8,
}

const fn rule(crossover: Crossover, histogram: HistogramRule, short_score: u8) -> MomentumRule {
    MomentumRule {
        crossover,
        histogram,
        short_score,
    }
}

const RULES: &[MomentumRule] = &[
    rule(Crossover::Bearish, HistogramRule::Negative, 95),
    rule(Crossover::Bearish, HistogramRule::NearZero, 75),
    rule(Crossover::Bearish, HistogramRule::Positive, 55),
    rule(Crossover::Bullish, HistogramRule::Positive, 15),
    rule(Crossover::Bullish, HistogramRule::NearZero, 25),
    rule(Crossover::Bullish, HistogramRule::Negative, 40),
    rule(Crossover::None, HistogramRule::Below(-DRIFT), 70),
    rule(Crossover::None, HistogramRule::Above(DRIFT), 30),
];

/// Score a crossover/histogram pair for the given side.
pub fn momentum_score(crossover: Crossover, macd_histogram: f64, direction: Direction) -> u8 {
    let (crossover, hist) = if direction.is_long() {
        (crossover.flipped(), -macd_histogram)
    } else {
        (crossover, macd_histogram)
    };

    let raw = RULES
        .iter()
        .find(|rule| rule.crossover == crossover && rule.histogram.matches(hist))
        .map(|rule| rule.short_score)
        .unwrap_or(NEUTRAL_SCORE);

    clamp_score(raw as f64)
}
