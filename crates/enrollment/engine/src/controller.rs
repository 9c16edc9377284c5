//! Instance controller: the state machine for one enrollment sequence
//!
//! Every operation is a pure function from `(current instance, input)` to
//! `(new instance | error)` — no I/O, no blocking, no partial mutation.
//! Concurrent callers are handled with optimistic concurrency: each
//! mutating operation takes the version the caller last read and fails
//! with a stale-version conflict if the instance has moved on.

use crate::gate;
use chrono::Utc;
use enrollment_types::{
    StepDefinition, StepId, StepPayload, StepState, StepStatus, SubjectId, WorkflowDefinition,
    WorkflowError, WorkflowInstance, WorkflowResult,
};
use serde::Serialize;
use std::collections::HashMap;

/// Read-only projection of an instance, served to callers
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    /// The single step currently eligible for completion or skip
    pub active_step_id: Option<StepId>,
    /// Per-step state, keyed by step id
    pub step_states: HashMap<StepId, StepState>,
    /// The finalization-gate predicate, evaluated live
    pub finalizable: bool,
}

/// The state machine for a single workflow definition
#[derive(Clone, Debug)]
pub struct InstanceController {
    definition: WorkflowDefinition,
}

impl InstanceController {
    /// Create a controller for a definition. Validates the definition,
    /// so every instance this controller touches is governed by a
    /// structurally sound sequence.
    pub fn new(definition: WorkflowDefinition) -> WorkflowResult<Self> {
        definition.validate()?;
        Ok(Self { definition })
    }

    /// The definition this controller drives
    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    /// Create a fresh instance for a subject: all steps pending except
    /// the first, which starts in progress.
    pub fn start(&self, subject_id: SubjectId) -> WorkflowInstance {
        let instance = WorkflowInstance::new(&self.definition, subject_id);
        tracing::info!(
            subject_id = %instance.subject_id,
            definition_id = %self.definition.id,
            "Enrollment instance started"
        );
        instance
    }

    /// Complete the active step with a captured payload.
    ///
    /// Guards, in order: stale version, not the active step, payload
    /// fails the step's declared shape. On success the step becomes
    /// `completed`, the payload is stored, the active pointer advances
    /// to the next pending step, and the version is bumped.
    pub fn complete_step(
        &self,
        instance: &WorkflowInstance,
        expected_version: u64,
        step_id: &StepId,
        payload: StepPayload,
    ) -> WorkflowResult<WorkflowInstance> {
        check_version(instance, expected_version)?;
        let step = self.active_step(instance, step_id)?;
        step.payload_shape
            .validate(&payload)
            .map_err(|reason| WorkflowError::PayloadInvalid {
                step: step_id.clone(),
                reason,
            })?;

        let from_order = step.order;
        let now = Utc::now();
        let mut next = instance.clone();
        if let Some(state) = next.step_states.get_mut(step_id) {
            state.status = StepStatus::Completed;
            state.payload = Some(payload);
            state.completed_at = Some(now);
        }
        self.advance_from(&mut next, from_order);
        next.version += 1;
        next.updated_at = now;

        tracing::info!(
            subject_id = %next.subject_id,
            step_id = %step_id,
            version = next.version,
            "Step completed"
        );
        Ok(next)
    }

    /// Skip the active step.
    ///
    /// Guards, in order: stale version, not the active step, step is
    /// required. Advances the active pointer exactly as completion does.
    pub fn skip_step(
        &self,
        instance: &WorkflowInstance,
        expected_version: u64,
        step_id: &StepId,
    ) -> WorkflowResult<WorkflowInstance> {
        check_version(instance, expected_version)?;
        let step = self.active_step(instance, step_id)?;
        if step.required {
            return Err(WorkflowError::CannotSkipRequired(step_id.clone()));
        }

        let from_order = step.order;
        let now = Utc::now();
        let mut next = instance.clone();
        if let Some(state) = next.step_states.get_mut(step_id) {
            state.status = StepStatus::Skipped;
            state.completed_at = Some(now);
        }
        self.advance_from(&mut next, from_order);
        next.version += 1;
        next.updated_at = now;

        tracing::info!(
            subject_id = %next.subject_id,
            step_id = %step_id,
            version = next.version,
            "Step skipped"
        );
        Ok(next)
    }

    /// Read-only projection of an instance. `finalizable` is the live
    /// gate predicate, not a cached value.
    pub fn snapshot(&self, instance: &WorkflowInstance) -> Snapshot {
        Snapshot {
            active_step_id: instance.active_step_id.clone(),
            step_states: instance.step_states.clone(),
            finalizable: gate::required_steps_completed(&self.definition, instance),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Resolve `step_id` against the active pointer; anything but the
    /// single active step is rejected.
    fn active_step(
        &self,
        instance: &WorkflowInstance,
        step_id: &StepId,
    ) -> WorkflowResult<&StepDefinition> {
        match &instance.active_step_id {
            Some(active) if active == step_id => {
                self.definition
                    .step(step_id)
                    .ok_or_else(|| WorkflowError::NotActiveStep {
                        step: step_id.clone(),
                        active: instance.active_step_id.clone(),
                    })
            }
            other => Err(WorkflowError::NotActiveStep {
                step: step_id.clone(),
                active: other.clone(),
            }),
        }
    }

    /// Advance the active pointer: the first pending step strictly after
    /// `from_order` becomes in-progress; none remaining clears the
    /// pointer (the instance is then eligible for finalization).
    fn advance_from(&self, instance: &mut WorkflowInstance, from_order: usize) {
        let mut next_active = None;
        for order in (from_order + 1)..self.definition.step_count() {
            if let Some(step) = self.definition.step_at(order) {
                let pending = instance
                    .step_state(&step.id)
                    .map(|s| s.status == StepStatus::Pending)
                    .unwrap_or(false);
                if pending {
                    next_active = Some(step.id.clone());
                    break;
                }
            }
        }

        if let Some(id) = &next_active {
            if let Some(state) = instance.step_states.get_mut(id) {
                state.status = StepStatus::InProgress;
            }
        }
        instance.active_step_id = next_active;
    }
}

/// Optimistic-concurrency check shared by every mutating operation
pub(crate) fn check_version(instance: &WorkflowInstance, supplied: u64) -> WorkflowResult<()> {
    if instance.version != supplied {
        return Err(WorkflowError::StaleVersion {
            supplied,
            current: instance.version,
        });
    }
    Ok(())
}
