// =============================================================================
// Short Scout — daily short-suitability scanner
// =============================================================================
//
// Scores a candidate list against a benchmark through four stages
// (relative strength, volatility, momentum, trend strength) and aggregates
// them into one 1-100 suitability score per symbol and analysis date.
// =============================================================================

pub mod analysis;
pub mod api;
pub mod app_state;
pub mod error;
pub mod indicators;
pub mod providers;
pub mod runtime_config;
pub mod scoring;
pub mod types;

#[cfg(test)]
mod test_support;
