// =============================================================================
// Volatility Scorer
// =============================================================================
//
// Weighted blend of three sub-scores:
//
//   40%  ATR ratio (ATR / price * 100)
//          < 1%      → 100
//          1 .. 2%   → 80 → 60
//          2 .. 5%   → 60
//          5 .. 10%  → 60 → 90
//          >= 10%    → 100
//   30%  Bollinger width (%)
//          < 2%      → 100
//          2 .. 3%   → 90 → 70
//          3 .. 6%   → 50
//          6 .. 12%  → 50 → 20
//          >= 12%    → 10
//   30%  Bollinger position (0..1 fraction), near the upper band is best
//          < 0.3     → 20
//          0.3 .. 0.4 → 30
//          0.4 .. 0.6 → 50
//          0.6 .. 0.7 → 75
//          0.7 .. 0.8 → 90
//          >= 0.8    → 85
//
// The long side reads the position table at `1 - position`, so price near the
// lower band rates best. ATR and width sub-scores are side-independent.
//
// With fewer than MIN_VOLATILITY_BARS of history the band indicators are not
// meaningful; a 2-bar return magnitude proxy is used instead.

use serde::{Deserialize, Serialize};

use crate::scoring::direction::{clamp_score, Direction, NEUTRAL_SCORE};
use crate::scoring::table::{Band, BandTable};
use crate::types::OhlcBar;

/// Minimum bars for the full ATR + Bollinger score.
pub const MIN_VOLATILITY_BARS: usize = 20;

const ATR_WEIGHT: f64 = 0.4;
const WIDTH_WEIGHT: f64 = 0.3;
const POSITION_WEIGHT: f64 = 0.3;

const ATR_TABLE: BandTable = BandTable {
    bands: &[
        Band::flat(1.0, 100.0),
        Band::ramp(2.0, 80.0, 60.0),
        Band::flat(5.0, 60.0),
        Band::ramp(10.0, 60.0, 90.0),
    ],
    above: 100.0,
};

const WIDTH_TABLE: BandTable = BandTable {
    bands: &[
        Band::flat(2.0, 100.0),
        Band::ramp(3.0, 90.0, 70.0),
        Band::flat(6.0, 50.0),
        Band::ramp(12.0, 50.0, 20.0),
    ],
    above: 10.0,
};

const POSITION_TABLE: BandTable = BandTable {
    bands: &[
        Band::flat(0.3, 20.0),
        Band::flat(0.4, 30.0),
        Band::flat(0.6, 50.0),
        Band::flat(0.7, 75.0),
        Band::flat(0.8, 90.0),
    ],
    above: 85.0,
};

/// 2-bar return magnitude (%) → proxy score.
const FALLBACK_TABLE: BandTable = BandTable {
    bands: &[Band::flat(1.0, 70.0), Band::flat(3.0, 50.0)],
    above: 30.0,
};

/// The three sub-scores and the blended result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityBreakdown {
    pub atr_sub: f64,
    pub width_sub: f64,
    pub position_sub: f64,
    pub score: u8,
}

pub fn volatility_breakdown(
    atr_ratio: f64,
    bb_width: f64,
    bb_position: f64,
    direction: Direction,
) -> VolatilityBreakdown {
    let position = if direction.is_long() {
        1.0 - bb_position
    } else {
        bb_position
    };

    let atr_sub = ATR_TABLE.lookup(atr_ratio);
    let width_sub = WIDTH_TABLE.lookup(bb_width);
    let position_sub = POSITION_TABLE.lookup(position);

    let raw = ATR_WEIGHT * atr_sub + WIDTH_WEIGHT * width_sub + POSITION_WEIGHT * position_sub;

    VolatilityBreakdown {
        atr_sub,
        width_sub,
        position_sub,
        score: clamp_score(raw),
    }
}

/// Blended volatility score in `[1, 100]`. `bb_position` is a 0..1 fraction.
pub fn volatility_score(
    atr_ratio: f64,
    bb_width: f64,
    bb_position: f64,
    direction: Direction,
) -> u8 {
    volatility_breakdown(atr_ratio, bb_width, bb_position, direction).score
}

/// Proxy score for short histories: the magnitude of the last close-to-close
/// return mapped onto {70, 50, 30}. Fewer than two usable bars score neutral.
///
/// Side-independent.
pub fn fallback_volatility_score(bars: &[OhlcBar]) -> u8 {
    match last_return_magnitude(bars) {
        Some(magnitude) => clamp_score(FALLBACK_TABLE.lookup(magnitude)),
        None => NEUTRAL_SCORE,
    }
}

/// `|close[-1] / close[-2] - 1| * 100`.
pub fn last_return_magnitude(bars: &[OhlcBar]) -> Option<f64> {
    if bars.len() < 2 {
        return None;
    }
    let prev = bars[bars.len() - 2].close;
    let last = bars[bars.len() - 1].close;
    if prev == 0.0 {
        return None;
    }
    let magnitude = ((last - prev) / prev * 100.0).abs();
    magnitude.is_finite().then_some(magnitude)
}
