// =============================================================================
// External collaborators
// =============================================================================
//
// The scoring core only sees these three seams:
// - HistoricalDataProvider: daily bars per symbol as of a date
// - CandidateSource:        the symbol universe for a run
// - ResultSink:             per-date upsert of aggregated results

pub mod bar_index;
pub mod candidates;
pub mod sink;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::analysis::AnalysisResult;
use crate::error::SinkError;
use crate::types::{Candidate, OhlcBar};

pub use bar_index::BarIndex;
pub use candidates::StaticCandidates;
pub use sink::{JsonDirectorySink, MemorySink};

#[async_trait]
pub trait HistoricalDataProvider: Send + Sync {
    /// Up to `count` most recent bars dated on or before `as_of`, oldest
    /// first. Unknown symbols yield an empty vec, never an error.
    async fn get_bars(&self, symbol: &str, as_of: NaiveDate, count: usize) -> Vec<OhlcBar>;
}

pub trait CandidateSource: Send + Sync {
    fn list(&self) -> Vec<Candidate>;
}

#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Replace whatever is stored for `date` with `results`.
    async fn save(&self, date: NaiveDate, results: &[AnalysisResult]) -> Result<(), SinkError>;

    /// Results stored for `date`, if any.
    async fn load(&self, date: NaiveDate) -> Result<Option<Vec<AnalysisResult>>, SinkError>;

    /// Every stored date, ascending.
    async fn dates(&self) -> Result<Vec<NaiveDate>, SinkError>;
}
