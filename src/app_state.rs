// =============================================================================
// Central Application State
// =============================================================================
//
// Ties the orchestrator, candidate source and result sink together for the
// REST API and the one-shot CLI run.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for the small pieces of mutable run bookkeeping.
//   - A tokio Mutex serialises runs; two runs never interleave their stages.
// =============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::{AnalysisOrchestrator, AnalysisReport, ProgressEvent};
use crate::error::AnalysisError;
use crate::providers::{CandidateSource, HistoricalDataProvider, ResultSink, StaticCandidates};
use crate::runtime_config::RuntimeConfig;
use crate::scoring::Direction;

// =============================================================================
// Run summary
// =============================================================================

/// Bookkeeping for the most recent completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub analysis_date: NaiveDate,
    pub direction: Direction,
    pub result_count: usize,
    pub defaulted_results: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl From<&AnalysisReport> for RunSummary {
    fn from(report: &AnalysisReport) -> Self {
        Self {
            run_id: report.run_id,
            analysis_date: report.analysis_date,
            direction: report.direction,
            result_count: report.results.len(),
            defaulted_results: report
                .results
                .iter()
                .filter(|r| !r.defaulted_stages.is_empty())
                .count(),
            started_at: report.started_at,
            finished_at: report.finished_at,
        }
    }
}

// =============================================================================
// AppState
// =============================================================================

/// Shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    /// Incremented after every completed run.
    pub state_version: AtomicU64,

    pub config: RuntimeConfig,
    pub orchestrator: AnalysisOrchestrator,
    pub candidates: Arc<dyn CandidateSource>,
    pub sink: Arc<dyn ResultSink>,

    pub last_run: RwLock<Option<RunSummary>>,
    /// Latest progress event of the run in flight, if any.
    pub progress: RwLock<Option<ProgressEvent>>,

    run_lock: tokio::sync::Mutex<()>,
}

impl AppState {
    pub fn new(
        config: RuntimeConfig,
        provider: Arc<dyn HistoricalDataProvider>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        let orchestrator = AnalysisOrchestrator::new(provider, config.analysis.clone());
        let candidates = Arc::new(StaticCandidates::new(config.candidates.clone()));
        Self {
            state_version: AtomicU64::new(0),
            config,
            orchestrator,
            candidates,
            sink,
            last_run: RwLock::new(None),
            progress: RwLock::new(None),
            run_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::Relaxed)
    }

    /// Run the full analysis for `date` over the configured candidates and
    /// persist the results. `direction` falls back to the configured default.
    pub async fn execute_run(
        &self,
        date: NaiveDate,
        direction: Option<Direction>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let _guard = self.run_lock.lock().await;
        let direction = direction.unwrap_or(self.config.direction);
        let candidates = self.candidates.list();

        let mut on_progress = |event: &ProgressEvent| {
            debug!(
                state = %event.state,
                symbol = %event.symbol,
                processed = event.processed,
                total = event.total,
                "run progress"
            );
            *self.progress.write() = Some(event.clone());
        };

        let outcome = self
            .orchestrator
            .run_and_save(self.sink.as_ref(), date, direction, &candidates, &mut on_progress)
            .await;
        *self.progress.write() = None;

        let report = outcome?;
        let summary = RunSummary::from(&report);
        info!(
            run_id = %summary.run_id,
            date = %summary.analysis_date,
            results = summary.result_count,
            defaulted = summary.defaulted_results,
            "run saved"
        );
        *self.last_run.write() = Some(summary);
        self.state_version.fetch_add(1, Ordering::Relaxed);
        Ok(report)
    }
}
