// =============================================================================
// Average Directional Index (ADX) — single-window approximation
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction. The scoring
// pipeline uses a one-shot approximation over the last `period` transitions
// instead of the doubly Wilder-smoothed series:
//
//   1. Sum +DM, -DM and True Range over the window.
//   2. +DI = sum(+DM) / sum(TR) * 100,  -DI = sum(-DM) / sum(TR) * 100
//   3. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   4. ADX ≈ DX, clamped to [ADX_FLOOR, ADX_CEILING]
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use crate::types::OhlcBar;

pub const ADX_FLOOR: f64 = 15.0;
pub const ADX_CEILING: f64 = 85.0;

/// Directional indicators behind an ADX reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxReading {
    pub plus_di: f64,
    pub minus_di: f64,
    pub dx: f64,
    /// `dx` clamped to `[ADX_FLOOR, ADX_CEILING]`.
    pub adx: f64,
}

/// Compute the approximate ADX over the last `period` bar transitions.
///
/// Returns `None` when `period` is zero, there are fewer than `period + 1`
/// bars, or any intermediate value is non-finite. A window with no range at
/// all reads as DX 0 and therefore clamps to the floor.
pub fn calculate_adx(bars: &[OhlcBar], period: usize) -> Option<AdxReading> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let window = &bars[bars.len() - (period + 1)..];
    if window
        .iter()
        .any(|b| !(b.high.is_finite() && b.low.is_finite() && b.close.is_finite()))
    {
        return None;
    }

    let mut sum_plus_dm = 0.0;
    let mut sum_minus_dm = 0.0;
    let mut sum_tr = 0.0;

    for pair in window.windows(2) {
        let (prev, cur) = (&pair[0], &pair[1]);

        let tr = (cur.high - cur.low)
            .max((cur.high - prev.close).abs())
            .max((cur.low - prev.close).abs());

        let up_move = cur.high - prev.high;
        let down_move = prev.low - cur.low;

        if up_move > down_move && up_move > 0.0 {
            sum_plus_dm += up_move;
        }
        if down_move > up_move && down_move > 0.0 {
            sum_minus_dm += down_move;
        }
        sum_tr += tr;
    }

    if !(sum_plus_dm.is_finite() && sum_minus_dm.is_finite() && sum_tr.is_finite()) {
        return None;
    }

    let (plus_di, minus_di, dx) = compute_dx(sum_plus_dm, sum_minus_dm, sum_tr);
    if !dx.is_finite() {
        return None;
    }

    Some(AdxReading {
        plus_di,
        minus_di,
        dx,
        adx: dx.clamp(ADX_FLOOR, ADX_CEILING),
    })
}

/// Returns `(+DI, -DI, DX)`; zero range or zero movement reads as DX 0.
fn compute_dx(plus_dm: f64, minus_dm: f64, tr: f64) -> (f64, f64, f64) {
    if tr == 0.0 {
        return (0.0, 0.0, 0.0);
    }

    let plus_di = plus_dm / tr * 100.0;
    let minus_di = minus_dm / tr * 100.0;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return (plus_di, minus_di, 0.0);
    }

    (plus_di, minus_di, (plus_di - minus_di).abs() / di_sum * 100.0)
}
