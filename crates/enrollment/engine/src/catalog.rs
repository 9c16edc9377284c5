//! Built-in definitions: the IHSS provider-enrollment sequence
//!
//! Five mandatory steps (SOC 426, orientation, DOJ background check,
//! SOC 846, workweek agreement) followed by optional direct-deposit
//! setup. Enrollment cannot be finalized until every mandatory step is
//! completed; direct deposit may be skipped.

use chrono::Utc;
use enrollment_types::{
    FieldType, PayloadShape, StepDefinition, WorkflowDefinition, WorkflowDefinitionId,
};

/// The standard provider-enrollment workflow definition
pub fn provider_enrollment() -> WorkflowDefinition {
    let steps = vec![
        StepDefinition::new("soc426", 0, "SOC 426 - Provider Enrollment Agreement")
            .with_description("Provider must complete and sign the SOC 426 form to begin enrollment.")
            .with_payload_shape(
                PayloadShape::new()
                    .field("signed_date", FieldType::Date)
                    .optional_field("witness_name", FieldType::Text),
            ),
        StepDefinition::new("orientation", 1, "Provider Orientation")
            .with_description("Provider must complete orientation training covering program rules.")
            .with_payload_shape(
                PayloadShape::new()
                    .field("completed_date", FieldType::Date)
                    .optional_field("location", FieldType::Text),
            ),
        StepDefinition::new("background_check", 2, "DOJ Background Check")
            .with_description("Submit fingerprints for DOJ background check and await clearance.")
            .with_payload_shape(
                PayloadShape::new()
                    .field("submission_date", FieldType::Date)
                    .field("agency_code", FieldType::Text),
            ),
        StepDefinition::new("soc846", 3, "SOC 846 - Provider Agreement")
            .with_description("Provider must sign the SOC 846 acknowledgment form.")
            .with_payload_shape(PayloadShape::new().field("signed_date", FieldType::Date)),
        StepDefinition::new("workweek", 4, "Workweek Agreement")
            .with_description(
                "Provider must establish a workweek agreement defining overtime calculations.",
            )
            .with_payload_shape(
                PayloadShape::new()
                    .field("start_day", FieldType::Text)
                    .field("signed_date", FieldType::Date),
            ),
        StepDefinition::new("direct_deposit", 5, "Direct Deposit Setup")
            .with_description("Provider may set up direct deposit for payment.")
            .optional()
            .with_payload_shape(
                PayloadShape::new()
                    .field("bank_name", FieldType::Text)
                    .field("routing_number", FieldType::Text)
                    .field("account_number", FieldType::Text),
            ),
    ];

    WorkflowDefinition {
        id: WorkflowDefinitionId::new("provider-enrollment"),
        name: "Provider Enrollment".into(),
        description: "Sequential onboarding for a new IHSS provider".into(),
        version: 1,
        steps,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FinalizationGate, InstanceController};
    use enrollment_types::{StepId, StepPayload, StepStatus, SubjectId, WorkflowError};
    use serde_json::{json, Value};

    fn payload(value: Value) -> StepPayload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_catalog_definition_is_valid() {
        let def = provider_enrollment();
        assert!(def.validate().is_ok());
        assert_eq!(def.step_count(), 6);
        assert_eq!(def.required_steps().count(), 5);
        assert_eq!(def.first_step().unwrap().id, StepId::new("soc426"));
        assert!(!def.step(&StepId::new("direct_deposit")).unwrap().required);
    }

    /// The full enrollment walk: five required steps completed in order,
    /// direct deposit skipped, then finalized exactly once.
    #[test]
    fn test_full_enrollment_walkthrough() {
        let def = provider_enrollment();
        let ctl = InstanceController::new(def.clone()).unwrap();
        let gate = FinalizationGate::new(def).unwrap();

        let mut inst = ctl.start(SubjectId::new("provider-4821"));
        assert_eq!(inst.active_step_id, Some(StepId::new("soc426")));

        // Skipping the first required step is rejected, state unchanged
        let rejected = ctl.skip_step(&inst, 0, &StepId::new("soc426"));
        assert!(matches!(rejected, Err(WorkflowError::CannotSkipRequired(_))));
        assert_eq!(inst.version, 0);

        inst = ctl
            .complete_step(
                &inst,
                0,
                &StepId::new("soc426"),
                payload(json!({ "signed_date": "2025-03-03", "witness_name": "M. Vu" })),
            )
            .unwrap();
        assert_eq!(inst.active_step_id, Some(StepId::new("orientation")));

        inst = ctl
            .complete_step(
                &inst,
                1,
                &StepId::new("orientation"),
                payload(json!({ "completed_date": "2025-03-10", "location": "County Office 19" })),
            )
            .unwrap();
        inst = ctl
            .complete_step(
                &inst,
                2,
                &StepId::new("background_check"),
                payload(json!({ "submission_date": "2025-03-12", "agency_code": "DOJ-19" })),
            )
            .unwrap();
        inst = ctl
            .complete_step(
                &inst,
                3,
                &StepId::new("soc846"),
                payload(json!({ "signed_date": "2025-03-18" })),
            )
            .unwrap();

        assert!(!gate.can_finalize(&inst));

        inst = ctl
            .complete_step(
                &inst,
                4,
                &StepId::new("workweek"),
                payload(json!({ "start_day": "SUNDAY", "signed_date": "2025-03-18" })),
            )
            .unwrap();

        // All required steps done; direct deposit is active and skippable
        assert_eq!(inst.active_step_id, Some(StepId::new("direct_deposit")));
        assert!(gate.can_finalize(&inst));

        inst = ctl
            .skip_step(&inst, 5, &StepId::new("direct_deposit"))
            .unwrap();
        assert_eq!(inst.active_step_id, None);
        assert_eq!(
            inst.step_state(&StepId::new("direct_deposit")).unwrap().status,
            StepStatus::Skipped
        );

        let sealed = gate.finalize(&inst, 6).unwrap();
        assert!(sealed.is_finalized());
        assert_eq!(sealed.version, 7);
        for step in ctl.definition().required_steps() {
            assert_eq!(
                sealed.step_state(&step.id).unwrap().status,
                StepStatus::Completed
            );
        }

        let again = gate.finalize(&sealed, sealed.version);
        assert!(matches!(again, Err(WorkflowError::AlreadyFinalized)));
    }

    #[test]
    fn test_direct_deposit_payload_shape() {
        let def = provider_enrollment();
        let shape = &def.step(&StepId::new("direct_deposit")).unwrap().payload_shape;

        let good = payload(json!({
            "bank_name": "Golden 1",
            "routing_number": "321175261",
            "account_number": "000123456"
        }));
        assert!(shape.validate(&good).is_ok());

        let missing = payload(json!({ "bank_name": "Golden 1" }));
        assert!(shape.validate(&missing).is_err());
    }
}
