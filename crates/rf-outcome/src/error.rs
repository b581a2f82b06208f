//! Error types for outcome evaluation

use thiserror::Error;

use rf_cycle::CycleError;

use crate::decision::DecisionError;
use crate::prize::Strategy;

/// Outcome evaluation error
///
/// Every variant is fatal for the round: it signals bad paytable data or a
/// broken call contract, never a transient condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OutcomeError {
    #[error("Mask length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    #[error("Index {index} out of range for length {length}")]
    IndexOutOfRange { index: usize, length: usize },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Strategy {strategy:?} is not supported for {evaluation} evaluation")]
    UnsupportedStrategy {
        strategy: Strategy,
        evaluation: &'static str,
    },

    #[error("Replacement count {replacements} does not match population count {populations}")]
    ReplacementCountMismatch {
        replacements: usize,
        populations: usize,
    },

    #[error("Progressive symbol '{0}' used outside a respin context")]
    ProgressiveOutsideRespin(String),

    #[error("Multiplier overflow on prize '{0}'")]
    MultiplierOverflow(String),

    #[error("Strip count {strips} does not match {expected}")]
    StripCountMismatch { strips: usize, expected: usize },

    #[error("Invalid window structure: {0}")]
    InvalidStructure(String),

    #[error("Strip is empty")]
    EmptyStrip,

    #[error("Total weight overflow")]
    WeightOverflow,

    #[error("Round exceeded {0} cycles")]
    CycleLimitExceeded(u32),

    #[error("Unknown stage: {0}")]
    UnknownStage(String),

    #[error("Decision error: {0}")]
    Decision(#[from] DecisionError),

    #[error("Cycle error: {0}")]
    Cycle(#[from] CycleError),
}

/// Result type alias
pub type OutcomeResult<T> = Result<T, OutcomeError>;
