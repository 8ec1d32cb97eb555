// Run state machine: Init → four stages → Aggregate → Done, or Failed at Init.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::model::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    Init,
    StageRelativeStrength,
    StageVolatility,
    StageMomentum,
    StageTrend,
    Aggregate,
    Done,
    Failed,
}

impl RunState {
    /// The following state on success. Terminal states map to themselves.
    pub fn next(self) -> Self {
        match self {
            Self::Init => Self::StageRelativeStrength,
            Self::StageRelativeStrength => Self::StageVolatility,
            Self::StageVolatility => Self::StageMomentum,
            Self::StageMomentum => Self::StageTrend,
            Self::StageTrend => Self::Aggregate,
            Self::Aggregate => Self::Done,
            Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn stage(self) -> Option<Stage> {
        match self {
            Self::StageRelativeStrength => Some(Stage::RelativeStrength),
            Self::StageVolatility => Some(Stage::Volatility),
            Self::StageMomentum => Some(Stage::Momentum),
            Self::StageTrend => Some(Stage::Trend),
            _ => None,
        }
    }
}

impl From<Stage> for RunState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::RelativeStrength => Self::StageRelativeStrength,
            Stage::Volatility => Self::StageVolatility,
            Stage::Momentum => Self::StageMomentum,
            Stage::Trend => Self::StageTrend,
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Init => "INIT",
            Self::StageRelativeStrength => "STAGE_RELATIVE_STRENGTH",
            Self::StageVolatility => "STAGE_VOLATILITY",
            Self::StageMomentum => "STAGE_MOMENTUM",
            Self::StageTrend => "STAGE_TREND",
            Self::Aggregate => "AGGREGATE",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        };
        f.write_str(label)
    }
}

/// Emitted after every symbol of every stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub run_id: Uuid,
    pub state: RunState,
    pub symbol: String,
    /// Symbols finished in this stage so far, including this one.
    pub processed: usize,
    pub total: usize,
}
