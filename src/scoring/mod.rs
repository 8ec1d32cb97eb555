// =============================================================================
// Scoring Module
// =============================================================================
//
// Four independent scorers mapping indicator readings to an integer 1..=100
// suitability score (higher = better candidate for the requested side):
// - Relative strength vs. the benchmark index
// - Volatility (ATR ratio + Bollinger width/position)
// - Momentum (SMA crossover + MACD histogram)
// - Trend strength (ADX)

pub mod direction;
pub mod momentum;
pub mod relative_strength;
pub mod table;
pub mod trend;
pub mod volatility;

pub use direction::{clamp_score, Direction, MAX_SCORE, MIN_SCORE, NEUTRAL_SCORE};
pub use momentum::{detect_crossover, momentum_score, Crossover, CrossoverReading};
pub use relative_strength::{percent_return, relative_strength_score};
pub use trend::{classify_trend, trend_strength_score, TrendStrength};
pub use volatility::{
    fallback_volatility_score, volatility_breakdown, volatility_score, VolatilityBreakdown,
    MIN_VOLATILITY_BARS,
};
