// Simple Moving Average over close prices, one value per full window.

use crate::types::OhlcBar;

/// Lazily yield the SMA of every `period`-bar window, sliding by one bar.
///
/// Yields nothing when `period` is zero or exceeds the number of bars.
pub fn calculate_sma(bars: &[OhlcBar], period: usize) -> impl Iterator<Item = f64> + '_ {
    let count = if period == 0 || bars.len() < period {
        0
    } else {
        bars.len() - period + 1
    };
    bars.windows(period.max(1))
        .take(count)
        .map(move |w| w.iter().map(|b| b.close).sum::<f64>() / period as f64)
}

/// The SMA of the last two windows as `(previous, current)`.
pub fn last_two(bars: &[OhlcBar], period: usize) -> Option<(f64, f64)> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }
    let tail = &bars[bars.len() - (period + 1)..];
    let mut iter = calculate_sma(tail, period);
    Some((iter.next()?, iter.next()?))
}
