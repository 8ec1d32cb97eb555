// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators feeding the scoring
// stages. Insufficient history never panics: each function documents the
// sentinel it returns instead (0.0, an empty series, or `None`).

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod sma;

pub use adx::{calculate_adx, AdxReading};
pub use atr::{calculate_atr, calculate_atr_ratio};
pub use bollinger::{calculate_bollinger, BollingerResult};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdResult};
pub use sma::calculate_sma;
