//! Workflow instances: one subject's progress through a definition
//!
//! The instance is an externally-owned value: the engine's operations are
//! pure functions that take the current instance and return a new one (or
//! an error), so the instance itself carries no behavior beyond
//! construction and queries.

use crate::{StepId, StepPayload, WorkflowDefinition, WorkflowDefinitionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Subject Identifier ───────────────────────────────────────────────

/// The entity being enrolled. Opaque to the engine; no semantics imposed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Step State ───────────────────────────────────────────────────────

/// Status of a single step within an instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not yet reached
    #[default]
    Pending,
    /// The single step currently eligible for completion or skip
    InProgress,
    /// Completed with a validated payload
    Completed,
    /// Skipped (only ever legal for optional steps)
    Skipped,
}

impl StepStatus {
    /// Whether this step has been acted on and will not be revisited
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

/// Runtime state of one step within an instance
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StepState {
    /// Current status
    pub status: StepStatus,
    /// Captured data, present only once the step is completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<StepPayload>,
    /// Set on transition into completed or skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// ── Workflow Instance ────────────────────────────────────────────────

/// One subject's enrollment: per-step states plus the active pointer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowInstance {
    /// The entity being enrolled
    pub subject_id: SubjectId,
    /// The definition governing this instance
    pub definition_id: WorkflowDefinitionId,
    /// Per-step state, keyed by step id
    pub step_states: HashMap<StepId, StepState>,
    /// The single step eligible for completion or skip; `None` once every
    /// step is resolved
    pub active_step_id: Option<StepId>,
    /// Monotonically increasing, bumped on every accepted transition.
    /// Callers supply the version they last read; a mismatch at apply
    /// time is a stale-version conflict.
    pub version: u64,
    /// When the instance was created
    pub created_at: DateTime<Utc>,
    /// When the instance was last mutated
    pub updated_at: DateTime<Utc>,
    /// Set by the finalization gate; immutable afterward
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finalized_at: Option<DateTime<Utc>>,
}

impl WorkflowInstance {
    /// Create a fresh instance: every step pending except the first,
    /// which starts in progress.
    pub fn new(definition: &WorkflowDefinition, subject_id: SubjectId) -> Self {
        let now = Utc::now();
        let first = definition.first_step().map(|s| s.id.clone());

        let step_states = definition
            .steps
            .iter()
            .map(|step| {
                let status = if Some(&step.id) == first.as_ref() {
                    StepStatus::InProgress
                } else {
                    StepStatus::Pending
                };
                (
                    step.id.clone(),
                    StepState {
                        status,
                        ..StepState::default()
                    },
                )
            })
            .collect();

        Self {
            subject_id,
            definition_id: definition.id.clone(),
            step_states,
            active_step_id: first,
            version: 0,
            created_at: now,
            updated_at: now,
            finalized_at: None,
        }
    }

    /// Get the state of a step
    pub fn step_state(&self, step_id: &StepId) -> Option<&StepState> {
        self.step_states.get(step_id)
    }

    /// Whether the finalization gate has sealed this instance
    pub fn is_finalized(&self) -> bool {
        self.finalized_at.is_some()
    }

    /// Whether every step has been completed or skipped
    pub fn is_fully_resolved(&self) -> bool {
        self.step_states.values().all(|s| s.status.is_resolved())
    }

    /// Number of steps currently in progress (invariant: 0 or 1)
    pub fn in_progress_count(&self) -> usize {
        self.step_states
            .values()
            .filter(|s| s.status == StepStatus::InProgress)
            .count()
    }

    /// Steps with a given status, as (id, state) pairs
    pub fn steps_with_status(&self, status: StepStatus) -> Vec<(&StepId, &StepState)> {
        self.step_states
            .iter()
            .filter(|(_, s)| s.status == status)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StepDefinition;

    fn make_definition() -> WorkflowDefinition {
        let mut def = WorkflowDefinition::new("Test").with_id("test");
        def.add_step(StepDefinition::new("first", 0, "First")).unwrap();
        def.add_step(StepDefinition::new("second", 1, "Second")).unwrap();
        def.add_step(StepDefinition::new("third", 2, "Third").optional())
            .unwrap();
        def
    }

    #[test]
    fn test_fresh_instance() {
        let def = make_definition();
        let inst = WorkflowInstance::new(&def, SubjectId::new("provider-1"));

        assert_eq!(inst.version, 0);
        assert_eq!(inst.active_step_id, Some(StepId::new("first")));
        assert_eq!(inst.in_progress_count(), 1);
        assert!(!inst.is_finalized());
        assert!(!inst.is_fully_resolved());

        let first = inst.step_state(&StepId::new("first")).unwrap();
        assert_eq!(first.status, StepStatus::InProgress);
        assert!(first.payload.is_none());
        assert!(first.completed_at.is_none());

        for id in ["second", "third"] {
            let state = inst.step_state(&StepId::new(id)).unwrap();
            assert_eq!(state.status, StepStatus::Pending);
        }
    }

    #[test]
    fn test_steps_with_status() {
        let def = make_definition();
        let inst = WorkflowInstance::new(&def, SubjectId::new("provider-1"));
        assert_eq!(inst.steps_with_status(StepStatus::Pending).len(), 2);
        assert_eq!(inst.steps_with_status(StepStatus::InProgress).len(), 1);
        assert_eq!(inst.steps_with_status(StepStatus::Completed).len(), 0);
    }

    #[test]
    fn test_status_serialization_names() {
        let json = serde_json::to_string(&StepStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let status: StepStatus = serde_json::from_str("\"skipped\"").unwrap();
        assert_eq!(status, StepStatus::Skipped);
    }

    #[test]
    fn test_is_resolved() {
        assert!(!StepStatus::Pending.is_resolved());
        assert!(!StepStatus::InProgress.is_resolved());
        assert!(StepStatus::Completed.is_resolved());
        assert!(StepStatus::Skipped.is_resolved());
    }
}
