//! Error taxonomy for the enrollment workflow engine
//!
//! Every variant is a local, caller-recoverable condition. An operation
//! either returns the new state or one of these — never both, never a
//! partial mutation. Retries (e.g. on [`WorkflowError::StaleVersion`])
//! are a caller concern; nothing is retried inside the engine.

use crate::{StepId, WorkflowDefinitionId};

/// Errors surfaced by the enrollment workflow engine
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Load-time definition validation failed; the definition is unusable.
    #[error("invalid workflow definition: {0}")]
    InvalidDefinition(String),

    /// Caller referenced a definition id that is not registered.
    #[error("unknown workflow definition '{0}'")]
    UnknownDefinition(WorkflowDefinitionId),

    /// The step acted on is not the current active step. Covers both
    /// "already resolved" and "not yet reached".
    #[error("step '{step}' is not the active step (active: {active:?})")]
    NotActiveStep {
        step: StepId,
        active: Option<StepId>,
    },

    /// Captured data does not satisfy the step's declared payload shape.
    #[error("payload for step '{step}' is invalid: {reason}")]
    PayloadInvalid { step: StepId, reason: String },

    /// Skip was attempted on a required step.
    #[error("required step '{0}' cannot be skipped")]
    CannotSkipRequired(StepId),

    /// Finalize was attempted while required steps remain incomplete.
    #[error("enrollment is not finalizable: required steps remain incomplete")]
    NotFinalizable,

    /// Finalize was attempted on an already-finalized instance.
    #[error("enrollment is already finalized")]
    AlreadyFinalized,

    /// Optimistic-concurrency conflict: the caller's snapshot is out of
    /// date. Reload and reconsider before retrying.
    #[error("stale version: supplied {supplied}, current {current}")]
    StaleVersion { supplied: u64, current: u64 },
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
