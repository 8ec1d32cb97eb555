// =============================================================================
// Relative Strength Scorer
// =============================================================================
//
// Rates a stock's return against the benchmark index over the same window.
// Excess return = stockReturn - indexReturn (percentage points).
//
// Short side: underperformers score high. The table is point-symmetric around
// (0, 50), so the long side is the short table read at the negated excess and
// `short(x) + long(x) == 100` (before clamping).
//
//   excess  < -15      → 95
//   -15 .. -5          → 95 → 75
//    -5 ..  0          → 75 → 50
//     0 ..  5          → 50 → 25
//     5 .. 15          → 25 → 5
//   excess >= 15       → 5

use crate::scoring::direction::{clamp_score, Direction};
use crate::scoring::table::{Band, BandTable};
use crate::types::OhlcBar;

const SHORT_TABLE: BandTable = BandTable {
    bands: &[
        Band::flat(-15.0, 95.0),
        Band::ramp(-5.0, 95.0, 75.0),
        Band::ramp(0.0, 75.0, 50.0),
        Band::ramp(5.0, 50.0, 25.0),
        Band::ramp(15.0, 25.0, 5.0),
    ],
    above: 5.0,
};

/// Score the excess return of a stock over its benchmark.
///
/// Non-increasing in `stock_return - index_return` for the short side and
/// strictly decreasing inside the ramped range.
pub fn relative_strength_score(stock_return: f64, index_return: f64, direction: Direction) -> u8 {
    let excess = stock_return - index_return;
    let lookup_at = if direction.is_long() { -excess } else { excess };
    clamp_score(SHORT_TABLE.lookup(lookup_at))
}

/// Percentage change from the first to the last close.
///
/// `None` with fewer than two bars, a zero starting close, or a non-finite
/// result.
pub fn percent_return(bars: &[OhlcBar]) -> Option<f64> {
    if bars.len() < 2 {
        return None;
    }
    let first = bars[0].close;
    let last = bars[bars.len() - 1].close;
    if first == 0.0 {
        return None;
    }
    let ret = (last - first) / first * 100.0;
    ret.is_finite().then_some(ret)
}
