// =============================================================================
// Analysis Module
// =============================================================================
//
// Chains the four scoring stages per symbol for one analysis date and
// aggregates them into the final weighted score.

pub mod model;
pub mod orchestrator;
pub mod params;
pub mod stages;
pub mod state;

pub use model::{AnalysisResult, Stage, StageDetail, StageResult, StockRecord};
pub use orchestrator::{AnalysisOrchestrator, AnalysisReport};
pub use params::AnalysisParams;
pub use state::{ProgressEvent, RunState};
