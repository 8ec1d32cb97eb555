// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`:
//
//   GET  /api/v1/health          liveness + run counter
//   GET  /api/v1/candidates      configured symbol universe
//   POST /api/v1/analysis        run and save one analysis date
//   GET  /api/v1/results         dates with saved results
//   GET  /api/v1/results/:date   re-fetch saved results for a date
//   GET  /api/v1/runs/last       summary of the most recent run
//
// CORS is configured permissively for development.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, warn};

use crate::analysis::{AnalysisResult, ProgressEvent};
use crate::app_state::AppState;
use crate::error::AnalysisError;
use crate::scoring::Direction;

type ApiError = (StatusCode, Json<serde_json::Value>);

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/candidates", get(candidates))
        .route("/api/v1/analysis", post(run_analysis))
        .route("/api/v1/results", get(result_dates))
        .route("/api/v1/results/:date", get(results_for_date))
        .route("/api/v1/runs/last", get(last_run))
        .layer(cors)
        .with_state(state)
}

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
    run_in_progress: Option<ProgressEvent>,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
        run_in_progress: state.progress.read().clone(),
    })
}

// =============================================================================
// Candidates
// =============================================================================

async fn candidates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.candidates.list())
}

// =============================================================================
// Analysis run
// =============================================================================

#[derive(Debug, Deserialize)]
struct AnalysisRequest {
    date: NaiveDate,
    #[serde(default)]
    direction: Option<Direction>,
}

#[derive(Serialize)]
struct AnalysisResponse {
    run_id: uuid::Uuid,
    analysis_date: NaiveDate,
    direction: Direction,
    benchmark_symbol: String,
    benchmark_return: f64,
    results: Vec<AnalysisResult>,
}

async fn run_analysis(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state
        .execute_run(req.date, req.direction)
        .await
        .map_err(|e| {
            let status = match &e {
                AnalysisError::BenchmarkUnavailable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                AnalysisError::ProviderUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                AnalysisError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status.is_server_error() {
                error!(date = %req.date, error = %e, "analysis run failed");
            } else {
                warn!(date = %req.date, error = %e, "analysis run rejected");
            }
            api_error(status, e.to_string())
        })?;

    Ok(Json(AnalysisResponse {
        run_id: report.run_id,
        analysis_date: report.analysis_date,
        direction: report.direction,
        benchmark_symbol: report.benchmark_symbol,
        benchmark_return: report.benchmark_return,
        results: report.results,
    }))
}

// =============================================================================
// Saved results
// =============================================================================

async fn result_dates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<NaiveDate>>, ApiError> {
    state.sink.dates().await.map(Json).map_err(|e| {
        error!(error = %e, "failed to list saved result dates");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

async fn results_for_date(
    State(state): State<Arc<AppState>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<Vec<AnalysisResult>>, ApiError> {
    match state.sink.load(date).await {
        Ok(Some(results)) => Ok(Json(results)),
        Ok(None) => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("no results saved for {date}"),
        )),
        Err(e) => {
            error!(%date, error = %e, "failed to load saved results");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

async fn last_run(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.last_run.read().clone() {
        Some(summary) => Json(summary).into_response(),
        None => Json(serde_json::json!({ "run": null, "message": "No run completed yet" }))
            .into_response(),
    }
}
