//! Top-level error type for `madness_core`
use crate::bracket::BracketError;
use crate::mode::ModeError;
use crate::team::TeamError;
use thiserror::Error;

/// Top-level error type for `madness_core`
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("Bracket error: {0}")]
    Bracket(#[from] BracketError),
    #[error("Mode error: {0}")]
    Mode(#[from] ModeError),
    #[error("Team error: {0}")]
    Team(#[from] TeamError),
}
