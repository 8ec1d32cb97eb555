// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), using the population standard deviation.
//
//   width    = (upper - lower) / middle * 100
//   position = (lastClose - lower) / (upper - lower)      (0..1 fraction)
//
// Position is always a fraction: 0.0 at the lower band, 1.0 at the upper band.
// It can leave that range when the last close breaks out of the bands.

use serde::{Deserialize, Serialize};

use crate::types::OhlcBar;

/// Result of a Bollinger Band calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
    pub position: f64,
}

impl BollingerResult {
    /// The all-zero result returned for insufficient history.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Calculate Bollinger Bands over the closes of the last `period` bars.
///
/// Returns [`BollingerResult::empty`] when:
/// - `period` is zero or there are fewer than `period` bars.
/// - Any input close is non-finite.
///
/// A zero middle band yields a zero width. Flat bands (upper == lower) put the
/// last close at position 0.5.
pub fn calculate_bollinger(bars: &[OhlcBar], period: usize, num_std: f64) -> BollingerResult {
    if period == 0 || bars.len() < period {
        return BollingerResult::empty();
    }

    let window = &bars[bars.len() - period..];
    if window.iter().any(|b| !b.close.is_finite()) {
        return BollingerResult::empty();
    }

    let middle = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
    let variance = window
        .iter()
        .map(|b| (b.close - middle).powi(2))
        .sum::<f64>()
        / period as f64;
    let std_dev = variance.sqrt();

    let upper = middle + num_std * std_dev;
    let lower = middle - num_std * std_dev;
    let width = if middle == 0.0 {
        0.0
    } else {
        (upper - lower) / middle * 100.0
    };

    let last_close = window[window.len() - 1].close;
    let band = upper - lower;
    let position = if band.abs() < f64::EPSILON {
        0.5
    } else {
        (last_close - lower) / band
    };

    BollingerResult {
        upper,
        middle,
        lower,
        width,
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::bars_from_closes;

    #[test]
    fn bollinger_basic() {
        let bars = bars_from_closes(&(1..=20).map(|x| x as f64).collect::<Vec<_>>());
        let bb = calculate_bollinger(&bars, 20, 2.0);
        assert!(bb.upper > bb.middle);
        assert!(bb.lower < bb.middle);
        assert!(bb.width > 0.0);
        // Rising series closes in the upper half of the bands.
        assert!(bb.position > 0.5 && bb.position < 1.0);
    }

    #[test]
    fn bollinger_insufficient_data() {
        let bars = bars_from_closes(&[1.0, 2.0, 3.0]);
        let bb = calculate_bollinger(&bars, 20, 2.0);
        assert!(bb.is_empty());
        assert_eq!(bb.width, 0.0);
        assert_eq!(bb.position, 0.0);
    }

    #[test]
    fn bollinger_flat() {
        let bars = bars_from_closes(&[100.0; 20]);
        let bb = calculate_bollinger(&bars, 20, 2.0);
        assert!(bb.width.abs() < 1e-10);
        assert!((bb.position - 0.5).abs() < 1e-10);
    }

    #[test]
    fn bollinger_known_values() {
        // closes 2,4,4,4,5,5,7,9: mean 5, population σ 2
        let bars = bars_from_closes(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let bb = calculate_bollinger(&bars, 8, 2.0);
        assert!((bb.middle - 5.0).abs() < 1e-12);
        assert!((bb.upper - 9.0).abs() < 1e-12);
        assert!((bb.lower - 1.0).abs() < 1e-12);
        assert!((bb.width - 160.0).abs() < 1e-9);
        assert!((bb.position - 1.0).abs() < 1e-12);
    }
}
