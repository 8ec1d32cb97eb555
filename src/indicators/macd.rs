// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line = EMA(fast) - EMA(slow), aligned on the bars both cover
//   Signal    = EMA(MACD line, signal)
//   Histogram = MACD - Signal, aligned on the signal series
//
// All three series end at the last input bar.

use serde::{Deserialize, Serialize};

use crate::indicators::ema::calculate_ema;
use crate::types::{closes, OhlcBar};

/// Full MACD output. Series lengths differ; each one ends at the last bar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdResult {
    /// Most recent histogram value, if any.
    pub fn last_histogram(&self) -> Option<f64> {
        self.histogram.last().copied()
    }
}

/// Compute MACD over closing prices.
///
/// Returns an empty result when there are fewer than `slow` bars or when
/// `fast >= slow`. The histogram stays empty until the MACD line has at least
/// `signal` values.
pub fn calculate_macd(bars: &[OhlcBar], fast: usize, slow: usize, signal: usize) -> MacdResult {
    if fast == 0 || fast >= slow || bars.len() < slow {
        return MacdResult::default();
    }

    let prices = closes(bars);
    let fast_ema = calculate_ema(&prices, fast);
    let slow_ema = calculate_ema(&prices, slow);

    // fast_ema[i] sits at bar fast-1+i, slow_ema[j] at bar slow-1+j.
    let offset = slow - fast;
    let macd: Vec<f64> = slow_ema
        .iter()
        .zip(fast_ema.iter().skip(offset))
        .map(|(s, f)| f - s)
        .collect();

    let signal_line = calculate_ema(&macd, signal);
    let histogram: Vec<f64> = macd
        .iter()
        .skip(macd.len().saturating_sub(signal_line.len()))
        .zip(signal_line.iter())
        .map(|(m, s)| m - s)
        .collect();

    MacdResult {
        macd,
        signal: signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bars_from_closes, wavy_bars};

    #[test]
    fn macd_insufficient_data_is_empty() {
        let bars = wavy_bars(25, 100.0);
        let result = calculate_macd(&bars, 12, 26, 9);
        assert!(result.macd.is_empty());
        assert!(result.histogram.is_empty());
        assert_eq!(result.last_histogram(), None);
    }

    #[test]
    fn macd_series_lengths() {
        let bars = wavy_bars(60, 100.0);
        let result = calculate_macd(&bars, 12, 26, 9);
        assert_eq!(result.macd.len(), 60 - 26 + 1);
        assert_eq!(result.signal.len(), result.macd.len() - 9 + 1);
        assert_eq!(result.histogram.len(), result.signal.len());
    }

    #[test]
    fn macd_line_without_histogram() {
        // 30 bars: 5 MACD values, not enough for a 9-period signal.
        let bars = wavy_bars(30, 100.0);
        let result = calculate_macd(&bars, 12, 26, 9);
        assert_eq!(result.macd.len(), 5);
        assert!(result.histogram.is_empty());
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let bars = bars_from_closes(&[50.0; 60]);
        let result = calculate_macd(&bars, 12, 26, 9);
        assert!(result.histogram.iter().all(|h| h.abs() < 1e-10));
    }

    #[test]
    fn macd_rising_series_is_positive() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let result = calculate_macd(&bars_from_closes(&closes), 12, 26, 9);
        assert!(result.macd.iter().all(|m| *m > 0.0));
    }

    #[test]
    fn macd_rejects_inverted_periods() {
        let bars = wavy_bars(60, 100.0);
        assert!(calculate_macd(&bars, 26, 12, 9).macd.is_empty());
    }
}
