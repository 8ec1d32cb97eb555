// =============================================================================
// API Module — REST surface over the analysis runner
// =============================================================================

pub mod rest;

pub use rest::router;
