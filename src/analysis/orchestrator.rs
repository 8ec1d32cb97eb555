// =============================================================================
// Analysis Orchestrator
// =============================================================================
//
// One run = one analysis date + one candidate list + one direction.
//
//   Init                   fetch the benchmark, build one StockRecord per symbol
//   StageRelativeStrength  ┐
//   StageVolatility        │ each stage finishes every symbol before the next
//   StageMomentum          │ stage starts; symbols within a stage may run with
//   StageTrend             ┘ bounded concurrency (order preserved)
//   Aggregate              finalScore = round(mean(four stage scores))
//   Done / Failed
//
// Per-symbol failures never abort the run. Only a missing benchmark at Init
// does; the machine then moves to Failed and the error is returned.

use std::pin::pin;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::analysis::model::{AnalysisResult, Stage, StockRecord};
use crate::analysis::params::AnalysisParams;
use crate::analysis::stages::{self, RunContext};
use crate::analysis::state::{ProgressEvent, RunState};
use crate::error::{AnalysisError, StageErrorKind};
use crate::providers::{HistoricalDataProvider, ResultSink};
use crate::scoring::{percent_return, Direction};
use crate::types::Candidate;

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub run_id: Uuid,
    pub analysis_date: NaiveDate,
    pub direction: Direction,
    pub benchmark_symbol: String,
    pub benchmark_return: f64,
    pub results: Vec<AnalysisResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// The benchmark's lookback window ending on or before the analysis date.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BenchmarkWindow {
    start: NaiveDate,
    end: NaiveDate,
    percent_return: f64,
}

/// Per-stage tallies, logged when a stage completes.
#[derive(Debug, Default, Clone, Copy)]
struct StageTally {
    scored: usize,
    defaulted: usize,
    skipped: usize,
}

pub struct AnalysisOrchestrator {
    provider: Arc<dyn HistoricalDataProvider>,
    params: AnalysisParams,
}

impl AnalysisOrchestrator {
    pub fn new(provider: Arc<dyn HistoricalDataProvider>, params: AnalysisParams) -> Self {
        Self { provider, params }
    }

    /// Execute a full run.
    ///
    /// `on_progress` is called after every symbol of every stage, in candidate
    /// order. Duplicate symbols in `candidates` are ignored after the first.
    pub async fn run(
        &self,
        date: NaiveDate,
        direction: Direction,
        candidates: &[Candidate],
        on_progress: &mut (dyn FnMut(&ProgressEvent) + Send),
    ) -> Result<AnalysisReport, AnalysisError> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let benchmark = self.params.benchmark_symbol.clone();

        let mut state = RunState::Init;
        let mut records: Vec<StockRecord> = Vec::new();
        let mut window: Option<BenchmarkWindow> = None;
        let mut failure: Option<AnalysisError> = None;
        let mut results = Vec::new();

        while !state.is_terminal() {
            match state {
                RunState::Init => {
                    info!(%run_id, %date, %direction, candidates = candidates.len(), "analysis run starting");
                    window = self.benchmark_window(date).await;
                    if window.is_none() {
                        error!(%run_id, benchmark = %benchmark, %date, "benchmark history unavailable; run failed");
                        on_progress(&ProgressEvent {
                            run_id,
                            state: RunState::Failed,
                            symbol: benchmark.clone(),
                            processed: 0,
                            total: candidates.len(),
                        });
                        failure = Some(AnalysisError::BenchmarkUnavailable {
                            symbol: benchmark.clone(),
                            date,
                        });
                        state = RunState::Failed;
                        continue;
                    }
                    records = dedup(candidates).into_iter().map(StockRecord::new).collect();
                }
                RunState::StageRelativeStrength
                | RunState::StageVolatility
                | RunState::StageMomentum
                | RunState::StageTrend => {
                    if let (Some(stage), Some(window)) = (state.stage(), window) {
                        let ctx = RunContext {
                            params: &self.params,
                            date,
                            direction,
                            index_return: window.percent_return,
                            window_start: window.start,
                            market_date: window.end,
                        };
                        self.run_stage(stage, ctx, &mut records, run_id, on_progress)
                            .await;
                    }
                }
                RunState::Aggregate => {
                    let calculated_at = Utc::now();
                    results = std::mem::take(&mut records)
                        .into_iter()
                        .map(|record| record.finish(direction, date, calculated_at))
                        .collect();
                }
                RunState::Done | RunState::Failed => {}
            }
            state = state.next();
        }

        if let Some(err) = failure {
            return Err(err);
        }

        info!(%run_id, %date, results = results.len(), "analysis run complete");

        Ok(AnalysisReport {
            run_id,
            analysis_date: date,
            direction,
            benchmark_symbol: benchmark,
            benchmark_return: window.map(|w| w.percent_return).unwrap_or_default(),
            results,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Run, then persist the results under the analysis date.
    pub async fn run_and_save(
        &self,
        sink: &dyn ResultSink,
        date: NaiveDate,
        direction: Direction,
        candidates: &[Candidate],
        on_progress: &mut (dyn FnMut(&ProgressEvent) + Send),
    ) -> Result<AnalysisReport, AnalysisError> {
        let report = self.run(date, direction, candidates, on_progress).await?;
        sink.save(date, &report.results).await?;
        Ok(report)
    }

    async fn benchmark_window(&self, date: NaiveDate) -> Option<BenchmarkWindow> {
        let lookback = self.params.relative_strength_lookback + 1;
        let bars = self
            .provider
            .get_bars(&self.params.benchmark_symbol, date, lookback)
            .await;
        if bars.len() < lookback {
            return None;
        }
        Some(BenchmarkWindow {
            start: bars.first()?.date,
            end: bars.last()?.date,
            percent_return: percent_return(&bars)?,
        })
    }

    async fn run_stage(
        &self,
        stage: Stage,
        ctx: RunContext<'_>,
        records: &mut [StockRecord],
        run_id: Uuid,
        on_progress: &mut (dyn FnMut(&ProgressEvent) + Send),
    ) {
        let total = records.len();
        let fetch_count = self.params.fetch_window(stage);
        let provider = self.provider.as_ref();
        let symbols: Vec<String> = records.iter().map(|r| r.symbol().to_string()).collect();
        let mut outcomes = Vec::with_capacity(total);

        let evaluations = stream::iter(symbols.into_iter().enumerate().map(
            move |(idx, symbol)| async move {
                let bars = provider.get_bars(&symbol, ctx.date, fetch_count).await;
                let price = bars
                    .last()
                    .filter(|b| b.date >= ctx.market_date)
                    .map(|b| b.close);
                let evaluation = stages::evaluate(stage, &symbol, &bars, &ctx);
                (idx, symbol, price, evaluation)
            },
        ))
        .buffered(self.params.stage_concurrency.max(1));
        let mut evaluations = pin!(evaluations);

        let mut processed = 0;
        while let Some((idx, symbol, price, evaluation)) = evaluations.next().await {
            processed += 1;
            on_progress(&ProgressEvent {
                run_id,
                state: RunState::from(stage),
                symbol,
                processed,
                total,
            });
            outcomes.push((idx, price, evaluation));
        }

        let mut tally = StageTally::default();
        for (idx, price, evaluation) in outcomes {
            let record = &mut records[idx];
            record.observe_price(price);
            match evaluation {
                Ok(eval) => {
                    record.set_scored(stage, eval.score, eval.detail);
                    tally.scored += 1;
                }
                Err(e) if e.kind() == StageErrorKind::Recoverable => {
                    debug!(symbol = %record.symbol(), %stage, error = %e, "stage defaulted to neutral score");
                    record.set_defaulted(stage, e.to_string());
                    tally.defaulted += 1;
                }
                Err(e) => {
                    warn!(symbol = %record.symbol(), %stage, error = %e, "stage failed; symbol left out of stage output");
                    tally.skipped += 1;
                }
            }
        }

        info!(
            %run_id,
            %stage,
            scored = tally.scored,
            defaulted = tally.defaulted,
            skipped = tally.skipped,
            "stage complete"
        );
    }
}

fn dedup(candidates: &[Candidate]) -> Vec<Candidate> {
    let mut seen = std::collections::HashSet::new();
    candidates
        .iter()
        .filter(|c| seen.insert(c.symbol.clone()))
        .cloned()
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::model::Stage;
    use crate::providers::{BarIndex, MemorySink};
    use crate::test_support::{bars_from_closes, day, ending_on, wavy_bars};

    fn falling(n: usize, start: f64) -> Vec<crate::types::OhlcBar> {
        let closes: Vec<f64> = (0..n).map(|i| start - i as f64 * 0.5).collect();
        bars_from_closes(&closes)
    }

    fn orchestrator(index: BarIndex) -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(Arc::new(index), AnalysisParams::default())
    }

    fn three_candidates() -> Vec<Candidate> {
        vec![
            Candidate::new("AAA", "Alpha"),
            Candidate::new("BBB", "Beta"),
            Candidate::new("GONE", "No History"),
        ]
    }

    fn index() -> BarIndex {
        BarIndex::from_series([
            ("SPY", wavy_bars(80, 400.0)),
            ("AAA", falling(80, 120.0)),
            ("BBB", wavy_bars(80, 50.0)),
        ])
    }

    #[tokio::test]
    async fn end_to_end_with_missing_symbol() {
        let orch = orchestrator(index());
        let report = orch
            .run(day(79), Direction::Short, &three_candidates(), &mut |_| {})
            .await
            .unwrap();

        assert_eq!(report.results.len(), 3);
        for result in &report.results {
            assert!((1..=100).contains(&result.final_score));
            assert_eq!(result.analysis_date, day(79));
        }

        let gone = report.results.iter().find(|r| r.symbol == "GONE").unwrap();
        assert_eq!(gone.final_score, 50);
        assert_eq!(gone.current_price, None);
        assert_eq!(gone.defaulted_stages, Stage::ALL.to_vec());

        let aaa = report.results.iter().find(|r| r.symbol == "AAA").unwrap();
        assert!(aaa.defaulted_stages.is_empty());
        assert_eq!(aaa.current_price, Some(120.0 - 79.0 * 0.5));
        // A steady decliner underperforms a flat benchmark.
        assert!(aaa.relative_strength_score > 50);
    }

    #[tokio::test]
    async fn missing_benchmark_fails_the_run() {
        let index = BarIndex::from_series([("AAA", falling(80, 120.0))]);
        let mut events = Vec::new();
        let err = orchestrator(index)
            .run(day(79), Direction::Short, &three_candidates(), &mut |e| {
                events.push(e.clone())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::BenchmarkUnavailable { .. }));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].state, RunState::Failed);
        assert_eq!(events[0].symbol, "SPY");
    }

    #[tokio::test]
    async fn progress_is_reported_after_every_symbol() {
        let orch = orchestrator(index());
        let mut events = Vec::new();
        orch.run(day(79), Direction::Short, &three_candidates(), &mut |e| {
            events.push(e.clone())
        })
        .await
        .unwrap();

        assert_eq!(events.len(), 3 * Stage::ALL.len());
        assert_eq!(events[0].state, RunState::StageRelativeStrength);
        assert_eq!(events[0].symbol, "AAA");
        assert_eq!(events[2].processed, 3);
        assert_eq!(events[2].total, 3);
        assert_eq!(events[11].state, RunState::StageTrend);
        assert!(events.iter().all(|e| e.run_id == events[0].run_id));
    }

    #[tokio::test]
    async fn concurrent_stage_matches_sequential() {
        let sequential = orchestrator(index())
            .run(day(79), Direction::Short, &three_candidates(), &mut |_| {})
            .await
            .unwrap();

        let params = AnalysisParams {
            stage_concurrency: 8,
            ..AnalysisParams::default()
        };
        let concurrent = AnalysisOrchestrator::new(Arc::new(index()), params)
            .run(day(79), Direction::Short, &three_candidates(), &mut |_| {})
            .await
            .unwrap();

        let scores = |r: &AnalysisReport| {
            r.results
                .iter()
                .map(|x| (x.symbol.clone(), x.stage_scores(), x.final_score))
                .collect::<Vec<_>>()
        };
        assert_eq!(scores(&sequential), scores(&concurrent));
    }

    #[tokio::test]
    async fn short_history_symbol_gets_fallback_volatility() {
        let index = BarIndex::from_series([
            ("SPY", wavy_bars(80, 400.0)),
            ("NEW", ending_on(wavy_bars(10, 30.0), 79)),
        ]);
        let report = orchestrator(index)
            .run(day(79), Direction::Short, &[Candidate::new("NEW", "Fresh Listing")], &mut |_| {})
            .await
            .unwrap();

        let result = &report.results[0];
        assert!([30, 50, 70].contains(&result.volatility_score));
        assert!(!result.defaulted_stages.contains(&Stage::Volatility));
        assert!(result.defaulted_stages.contains(&Stage::RelativeStrength));
        assert!(result.defaulted_stages.contains(&Stage::Trend));
    }

    #[tokio::test]
    async fn stale_history_is_not_scored_as_current() {
        let index = BarIndex::from_series([
            ("SPY", wavy_bars(80, 400.0)),
            ("STALE", falling(41, 100.0)),
            ("AAA", falling(80, 120.0)),
        ]);
        let candidates = vec![Candidate::new("STALE", "Delisted"), Candidate::new("AAA", "Alpha")];
        let report = orchestrator(index)
            .run(day(79), Direction::Short, &candidates, &mut |_| {})
            .await
            .unwrap();

        let stale = &report.results[0];
        assert_eq!(stale.symbol, "STALE");
        assert_eq!(stale.current_price, None);
        assert_eq!(stale.defaulted_stages, Stage::ALL.to_vec());
        assert_eq!(stale.stage_scores(), [50; 4]);
        assert_eq!(stale.final_score, 50);
        assert!(report.results[1].defaulted_stages.is_empty());
    }

    #[tokio::test]
    async fn benchmark_return_is_reported() {
        let mut closes = vec![400.0; 80];
        closes[79] = 440.0;
        let index = BarIndex::from_series([("SPY", bars_from_closes(&closes))]);
        let report = orchestrator(index)
            .run(day(79), Direction::Short, &[], &mut |_| {})
            .await
            .unwrap();
        assert!((report.benchmark_return - 10.0).abs() < 1e-9);
        assert!(report.results.is_empty());
    }

    #[tokio::test]
    async fn computation_failure_is_isolated() {
        let mut broken = wavy_bars(80, 60.0);
        broken.last_mut().unwrap().close = f64::NAN;
        let index = BarIndex::from_series([
            ("SPY", wavy_bars(80, 400.0)),
            ("BAD", broken),
            ("AAA", falling(80, 120.0)),
        ]);
        let candidates = vec![Candidate::new("BAD", "Broken"), Candidate::new("AAA", "Alpha")];
        let report = orchestrator(index)
            .run(day(79), Direction::Short, &candidates, &mut |_| {})
            .await
            .unwrap();

        assert_eq!(report.results.len(), 2);
        let bad = &report.results[0];
        assert_eq!(bad.final_score, 50);
        assert_eq!(bad.defaulted_stages.len(), 4);
        assert!(report.results[1].defaulted_stages.is_empty());
    }

    #[tokio::test]
    async fn duplicate_candidates_are_scored_once() {
        let mut candidates = three_candidates();
        candidates.push(Candidate::new("AAA", "Alpha again"));
        let report = orchestrator(index())
            .run(day(79), Direction::Short, &candidates, &mut |_| {})
            .await
            .unwrap();
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0].name, "Alpha");
    }

    #[tokio::test]
    async fn long_run_mirrors_relative_strength() {
        let orch = orchestrator(index());
        let short = orch
            .run(day(79), Direction::Short, &three_candidates(), &mut |_| {})
            .await
            .unwrap();
        let long = orch
            .run(day(79), Direction::Long, &three_candidates(), &mut |_| {})
            .await
            .unwrap();

        let s = &short.results[0];
        let l = &long.results[0];
        assert_eq!(l.direction, Direction::Long);
        let sum = s.relative_strength_score as i32 + l.relative_strength_score as i32;
        assert!((sum - 100).abs() <= 1);
    }

    #[tokio::test]
    async fn run_and_save_persists_by_date() {
        let sink = MemorySink::default();
        let orch = orchestrator(index());
        orch.run_and_save(&sink, day(79), Direction::Short, &three_candidates(), &mut |_| {})
            .await
            .unwrap();

        let saved = sink.load(day(79)).await.unwrap().unwrap();
        assert_eq!(saved.len(), 3);
        assert!(sink.load(day(78)).await.unwrap().is_none());
    }
}
