// =============================================================================
// Average True Range (ATR) — Simple Average Method
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the plain mean of the last `period` TR values. Insufficient history
// yields the 0.0 sentinel instead of an error so that the volatility stage can
// keep going.
//
// Default period: 14
// =============================================================================

use crate::types::OhlcBar;

/// Compute the ATR of the last `period` bars.
///
/// Returns `0.0` when `period` is zero, when there are fewer than
/// `period + 1` bars, or when any intermediate value is non-finite.
pub fn calculate_atr(bars: &[OhlcBar], period: usize) -> f64 {
    if period == 0 || bars.len() < period + 1 {
        return 0.0;
    }

    let window = &bars[bars.len() - (period + 1)..];
    let sum: f64 = window.windows(2).map(|pair| true_range(&pair[1], pair[0].close)).sum();
    let atr = sum / period as f64;

    if atr.is_finite() {
        atr
    } else {
        0.0
    }
}

/// ATR as a percentage of the latest close.
///
/// Returns `None` when there is no usable ATR or the latest close is zero.
pub fn calculate_atr_ratio(bars: &[OhlcBar], period: usize) -> Option<f64> {
    let atr = calculate_atr(bars, period);
    let last_close = bars.last()?.close;
    if atr == 0.0 || last_close == 0.0 {
        return None;
    }
    let ratio = atr / last_close * 100.0;
    ratio.is_finite().then_some(ratio)
}

fn true_range(bar: &OhlcBar, prev_close: f64) -> f64 {
    // f64::max swallows NaN, so poison the value explicitly.
    if !(bar.high.is_finite() && bar.low.is_finite() && prev_close.is_finite()) {
        return f64::NAN;
    }
    let hl = bar.high - bar.low;
    let hc = (bar.high - prev_close).abs();
    let lc = (bar.low - prev_close).abs();
    hl.max(hc).max(lc)
}
