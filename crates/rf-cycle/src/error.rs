//! Error types for cycle bookkeeping

use thiserror::Error;

use crate::cycle::CycleId;
use crate::stage::ResultKind;

/// Cycle bookkeeping error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CycleError {
    #[error("No pending cycle to complete")]
    NoPendingCycle,

    #[error("Unknown cycle: {0}")]
    UnknownCycle(CycleId),

    #[error("Stage result '{name}' of kind {kind:?} cannot seed cycle inputs")]
    UnsupportedResultType { name: String, kind: ResultKind },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias
pub type CycleResult<T> = Result<T, CycleError>;
