// =============================================================================
// Trend Strength Scorer
// =============================================================================
//
// Range-bound markets favour shorts; strong trends favour longs. One band table
// carries both columns:
//
//   ADX          strength       short  long
//   < 20         No Trend         85    15
//   20 .. 25     Weak             75    25
//   25 .. 50     Strong           25    75
//   50 .. 75     Very Strong      15    85
//   >= 75        Extreme          35    65

use serde::{Deserialize, Serialize};

use crate::scoring::direction::{clamp_score, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrendStrength {
    #[serde(rename = "No Trend")]
    NoTrend,
    Weak,
    Strong,
    #[serde(rename = "Very Strong")]
    VeryStrong,
    Extreme,
}

impl std::fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoTrend => write!(f, "No Trend"),
            Self::Weak => write!(f, "Weak"),
            Self::Strong => write!(f, "Strong"),
            Self::VeryStrong => write!(f, "Very Strong"),
            Self::Extreme => write!(f, "Extreme"),
        }
    }
}

struct TrendBand {
    upper: f64,
    strength: TrendStrength,
    short_score: u8,
    long_score: u8,
}

const fn band(upper: f64, strength: TrendStrength, short_score: u8, long_score: u8) -> TrendBand {
    TrendBand {
        upper,
        strength,
        short_score,
        long_score,
    }
}

const TREND_BANDS: &[TrendBand] = &[
    band(20.0, TrendStrength::NoTrend, 85, 15),
    band(25.0, TrendStrength::Weak, 75, 25),
    band(50.0, TrendStrength::Strong, 25, 75),
    band(75.0, TrendStrength::VeryStrong, 15, 85),
    band(f64::INFINITY, TrendStrength::Extreme, 35, 65),
];

/// Classify an ADX value. NaN reads as `Extreme` (no band matches below it).
pub fn classify_trend(adx: f64) -> TrendStrength {
    band_for(adx).strength
}

/// Score an ADX value for the given side, with its strength label.
pub fn trend_strength_score(adx: f64, direction: Direction) -> (u8, TrendStrength) {
    let band = band_for(adx);
    let raw = match direction {
        Direction::Short => band.short_score,
        Direction::Long => band.long_score,
    };
    (clamp_score(raw as f64), band.strength)
}

fn band_for(adx: f64) -> &'static TrendBand {
    TREND_BANDS
        .iter()
        .find(|band| adx < band.upper)
        .unwrap_or(&TREND_BANDS[TREND_BANDS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bound_market_is_a_short_candidate() {
        assert_eq!(
            trend_strength_score(18.0, Direction::Short),
            (85, TrendStrength::NoTrend)
        );
        assert_eq!(
            trend_strength_score(60.0, Direction::Short),
            (15, TrendStrength::VeryStrong)
        );
    }

    #[test]
    fn band_edges_are_half_open() {
        assert_eq!(classify_trend(19.999), TrendStrength::NoTrend);
        assert_eq!(classify_trend(20.0), TrendStrength::Weak);
        assert_eq!(classify_trend(25.0), TrendStrength::Strong);
        assert_eq!(classify_trend(50.0), TrendStrength::VeryStrong);
        assert_eq!(classify_trend(75.0), TrendStrength::Extreme);
        assert_eq!(classify_trend(1e9), TrendStrength::Extreme);
    }

    #[test]
    fn long_column_mirrors_short_column() {
        for adx in [5.0, 22.0, 30.0, 60.0, 90.0] {
            let (short, _) = trend_strength_score(adx, Direction::Short);
            let (long, _) = trend_strength_score(adx, Direction::Long);
            assert_eq!(short as u16 + long as u16, 100);
        }
    }

    #[test]
    fn extreme_inputs_stay_in_range() {
        for adx in [f64::NEG_INFINITY, -50.0, f64::NAN, f64::INFINITY] {
            let (score, _) = trend_strength_score(adx, Direction::Short);
            assert!((1..=100).contains(&score));
        }
    }

    #[test]
    fn strength_labels() {
        assert_eq!(TrendStrength::NoTrend.to_string(), "No Trend");
        assert_eq!(
            serde_json::to_string(&TrendStrength::VeryStrong).unwrap(),
            "\"Very Strong\""
        );
    }
}
