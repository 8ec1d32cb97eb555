use serde::{Deserialize, Serialize};

/// Which side a score rates suitability for.
///
/// Every scorer is written once against the short-side contract; the long
/// side is its documented mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    #[default]
    Short,
}

impl Direction {
    pub fn is_long(self) -> bool {
        matches!(self, Self::Long)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(Self::Long),
            "short" => Ok(Self::Short),
            other => Err(format!("unknown direction '{other}', expected long or short")),
        }
    }
}

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 100;
pub const NEUTRAL_SCORE: u8 = 50;

/// Round and clamp a raw score into `[1, 100]`. NaN maps to the neutral 50.
pub fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return NEUTRAL_SCORE;
    }
    raw.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8
}
