//! Finalization gate: the terminal transition
//!
//! A pure predicate (every required step completed) plus the one-way
//! transition that seals an instance. Once finalized, no mutating
//! operation accepts the instance again; only read-only snapshots do.

use crate::controller::check_version;
use chrono::Utc;
use enrollment_types::{
    StepStatus, WorkflowDefinition, WorkflowError, WorkflowInstance, WorkflowResult,
};

/// True iff every required step in the definition is completed.
///
/// Optional steps may be pending, skipped, or completed — the predicate
/// deliberately checks required steps only.
pub fn required_steps_completed(
    definition: &WorkflowDefinition,
    instance: &WorkflowInstance,
) -> bool {
    definition.required_steps().all(|step| {
        instance
            .step_state(&step.id)
            .map(|s| s.status == StepStatus::Completed)
            .unwrap_or(false)
    })
}

/// The terminal gate for a single workflow definition
#[derive(Clone, Debug)]
pub struct FinalizationGate {
    definition: WorkflowDefinition,
}

impl FinalizationGate {
    /// Create a gate for a definition. Validates the definition, which
    /// also guarantees at least one required step exists — the predicate
    /// is never trivially true.
    pub fn new(definition: WorkflowDefinition) -> WorkflowResult<Self> {
        definition.validate()?;
        Ok(Self { definition })
    }

    /// The finalization predicate, evaluated against the instance now
    pub fn can_finalize(&self, instance: &WorkflowInstance) -> bool {
        required_steps_completed(&self.definition, instance)
    }

    /// Seal the instance.
    ///
    /// Guards, in order: stale version, already finalized, required
    /// steps incomplete. On success `finalized_at` is set and the
    /// version bumped. Any optional step still open at this point is
    /// resolved to `skipped` and the active pointer cleared, so a
    /// finalized instance never has a step in progress.
    pub fn finalize(
        &self,
        instance: &WorkflowInstance,
        expected_version: u64,
    ) -> WorkflowResult<WorkflowInstance> {
        check_version(instance, expected_version)?;
        if instance.is_finalized() {
            return Err(WorkflowError::AlreadyFinalized);
        }
        if !self.can_finalize(instance) {
            return Err(WorkflowError::NotFinalizable);
        }

        let now = Utc::now();
        let mut next = instance.clone();
        for state in next.step_states.values_mut() {
            if !state.status.is_resolved() {
                state.status = StepStatus::Skipped;
                state.completed_at = Some(now);
            }
        }
        next.active_step_id = None;
        next.finalized_at = Some(now);
        next.version += 1;
        next.updated_at = now;

        tracing::info!(
            subject_id = %next.subject_id,
            version = next.version,
            "Enrollment finalized"
        );
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InstanceController;
    use enrollment_types::{StepDefinition, StepId, StepPayload, SubjectId};

    fn make_definition() -> WorkflowDefinition {
        let mut def = WorkflowDefinition::new("Gate Test").with_id("gate-test");
        def.add_step(StepDefinition::new("agreement", 0, "Agreement"))
            .unwrap();
        def.add_step(StepDefinition::new("banking", 1, "Banking").optional())
            .unwrap();
        def
    }

    fn controller_and_gate() -> (InstanceController, FinalizationGate) {
        let def = make_definition();
        (
            InstanceController::new(def.clone()).unwrap(),
            FinalizationGate::new(def).unwrap(),
        )
    }

    #[test]
    fn test_not_finalizable_while_required_open() {
        let (ctl, gate) = controller_and_gate();
        let inst = ctl.start(SubjectId::new("provider-1"));

        assert!(!gate.can_finalize(&inst));
        let result = gate.finalize(&inst, 0);
        assert!(matches!(result, Err(WorkflowError::NotFinalizable)));
        assert!(!inst.is_finalized());
    }

    #[test]
    fn test_finalize_after_required_completed() {
        let (ctl, gate) = controller_and_gate();
        let mut inst = ctl.start(SubjectId::new("provider-1"));
        inst = ctl
            .complete_step(&inst, 0, &StepId::new("agreement"), StepPayload::new())
            .unwrap();

        // Required step done; the optional banking step is now active,
        // but the gate only checks required steps
        assert!(gate.can_finalize(&inst));
        let sealed = gate.finalize(&inst, 1).unwrap();

        assert!(sealed.is_finalized());
        assert_eq!(sealed.version, 2);
        assert_eq!(sealed.active_step_id, None);
        assert_eq!(sealed.in_progress_count(), 0);
        // The open optional step was resolved to skipped
        assert_eq!(
            sealed.step_state(&StepId::new("banking")).unwrap().status,
            StepStatus::Skipped
        );
    }

    #[test]
    fn test_finalize_twice_rejected() {
        let (ctl, gate) = controller_and_gate();
        let mut inst = ctl.start(SubjectId::new("provider-1"));
        inst = ctl
            .complete_step(&inst, 0, &StepId::new("agreement"), StepPayload::new())
            .unwrap();
        let sealed = gate.finalize(&inst, 1).unwrap();

        let result = gate.finalize(&sealed, sealed.version);
        assert!(matches!(result, Err(WorkflowError::AlreadyFinalized)));
    }

    #[test]
    fn test_finalize_with_stale_version() {
        let (ctl, gate) = controller_and_gate();
        let mut inst = ctl.start(SubjectId::new("provider-1"));
        inst = ctl
            .complete_step(&inst, 0, &StepId::new("agreement"), StepPayload::new())
            .unwrap();

        let result = gate.finalize(&inst, 0);
        assert!(matches!(result, Err(WorkflowError::StaleVersion { .. })));
        assert!(!inst.is_finalized());
    }

    #[test]
    fn test_finalized_instance_rejects_step_operations() {
        let (ctl, gate) = controller_and_gate();
        let mut inst = ctl.start(SubjectId::new("provider-1"));
        inst = ctl
            .complete_step(&inst, 0, &StepId::new("agreement"), StepPayload::new())
            .unwrap();
        let sealed = gate.finalize(&inst, 1).unwrap();

        let result = ctl.complete_step(
            &sealed,
            sealed.version,
            &StepId::new("banking"),
            StepPayload::new(),
        );
        assert!(matches!(result, Err(WorkflowError::NotActiveStep { .. })));
    }

    #[test]
    fn test_gate_rejects_invalid_definition() {
        let def = WorkflowDefinition::new("Empty");
        assert!(matches!(
            FinalizationGate::new(def),
            Err(WorkflowError::InvalidDefinition(_))
        ));
    }
}
