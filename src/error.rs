use chrono::NaiveDate;
use thiserror::Error;

/// Per-symbol, per-stage failure. Never aborts a run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StageError {
    #[error("insufficient history: need {required} bars, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("symbol '{symbol}' not found in the historical index")]
    LookupMiss { symbol: String },

    #[error("history for '{symbol}' ends on {last}, market date is {expected}")]
    StaleHistory {
        symbol: String,
        last: NaiveDate,
        expected: NaiveDate,
    },

    #[error("computation failed: {0}")]
    Computation(String),
}

/// How the orchestrator treats a [`StageError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageErrorKind {
    /// Expected gap in the data; the stage yields a neutral default.
    Recoverable,
    /// Unexpected failure; the symbol is left out of the stage's output.
    Unexpected,
}

impl StageError {
    pub fn kind(&self) -> StageErrorKind {
        match self {
            Self::InsufficientData { .. } | Self::LookupMiss { .. } | Self::StaleHistory { .. } => {
                StageErrorKind::Recoverable
            }
            Self::Computation(_) => StageErrorKind::Unexpected,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind() == StageErrorKind::Recoverable
    }
}

/// Failures while persisting or re-fetching results.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("result store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("result serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Run-level failure surfaced to the caller.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("historical data unavailable: {reason}")]
    ProviderUnavailable { reason: String },

    #[error("benchmark '{symbol}' has no usable history on or before {date}")]
    BenchmarkUnavailable { symbol: String, date: NaiveDate },

    #[error(transparent)]
    Sink(#[from] SinkError),
}
