//! Error types for session and stage construction

use shapeshift_core::ShapeMapError;
use thiserror::Error;

/// Stage list errors
#[derive(Debug, Error, PartialEq)]
pub enum StageError {
    #[error("no stages configured")]
    Empty,

    #[error("stage index {index} out of range (have {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown stage '{0}'")]
    UnknownStage(String),

    #[error("duplicate stage name '{0}'")]
    DuplicateName(String),

    #[error("no stage before '{0}'")]
    NoPreviousStage(String),
}

/// Errors raised while building or exporting a game session
#[derive(Debug, Error)]
pub enum GameError {
    #[error("invalid shape roster: {0}")]
    Roster(#[from] ShapeMapError),

    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("telemetry export failed: {0}")]
    Export(#[from] serde_json::Error),
}
