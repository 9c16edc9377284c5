//! Workflow definitions: the blueprint for an enrollment sequence
//!
//! A WorkflowDefinition is a finite, ordered list of steps — some
//! mandatory, some optional — each declaring the shape of the data it
//! captures. Definitions are immutable once validated; there is no
//! runtime API to mutate one.

use crate::{PayloadShape, WorkflowError, WorkflowResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ── Identifiers ──────────────────────────────────────────────────────

/// Unique identifier for a workflow definition
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowDefinitionId(pub String);

impl WorkflowDefinitionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for WorkflowDefinitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a step within a workflow definition
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepId(pub String);

impl StepId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Step Definition ──────────────────────────────────────────────────

/// One unit of work in the enrollment sequence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Unique identifier within this workflow
    pub id: StepId,
    /// Position in the sequence, 0-based and contiguous
    pub order: usize,
    /// Human-readable title
    pub title: String,
    /// Description of what this step accomplishes
    pub description: String,
    /// Required steps can never be skipped
    pub required: bool,
    /// Schema for the data this step captures
    pub payload_shape: PayloadShape,
}

impl StepDefinition {
    /// Create a required step
    pub fn new(id: impl Into<String>, order: usize, title: impl Into<String>) -> Self {
        Self {
            id: StepId::new(id),
            order,
            title: title.into(),
            description: String::new(),
            required: true,
            payload_shape: PayloadShape::new(),
        }
    }

    /// Mark this step as skippable
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_payload_shape(mut self, shape: PayloadShape) -> Self {
        self.payload_shape = shape;
        self
    }
}

// ── Workflow Definition ──────────────────────────────────────────────

/// A workflow definition — the blueprint for an enrollment sequence
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Unique identifier
    pub id: WorkflowDefinitionId,
    /// Human-readable name
    pub name: String,
    /// Description of what this workflow accomplishes
    pub description: String,
    /// Version for tracking definition evolution
    pub version: u32,
    /// The steps, in sequence order
    pub steps: Vec<StepDefinition>,
    /// When this definition was created
    pub created_at: DateTime<Utc>,
}

impl WorkflowDefinition {
    /// Create a new workflow definition with a generated id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WorkflowDefinitionId::generate(),
            name: name.into(),
            description: String::new(),
            version: 1,
            steps: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Replace the generated id with a stable one
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = WorkflowDefinitionId::new(id);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a step to the sequence
    pub fn add_step(&mut self, step: StepDefinition) -> WorkflowResult<()> {
        if self.steps.iter().any(|s| s.id == step.id) {
            return Err(WorkflowError::InvalidDefinition(format!(
                "duplicate step id '{}'",
                step.id
            )));
        }
        self.steps.push(step);
        Ok(())
    }

    /// Get a step by id
    pub fn step(&self, id: &StepId) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| &s.id == id)
    }

    /// Get the step at a given sequence position
    pub fn step_at(&self, order: usize) -> Option<&StepDefinition> {
        self.steps.iter().find(|s| s.order == order)
    }

    /// The first step in the sequence
    pub fn first_step(&self) -> Option<&StepDefinition> {
        self.step_at(0)
    }

    /// Steps flagged as required, in sequence order
    pub fn required_steps(&self) -> impl Iterator<Item = &StepDefinition> {
        self.steps.iter().filter(|s| s.required)
    }

    /// Total number of steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Validate the definition for structural correctness.
    ///
    /// A valid definition has at least one step, unique step ids, a
    /// contiguous 0-based `order` sequence, and at least one required
    /// step. A definition with zero required steps would make
    /// finalization trivially always-true, so it is a configuration
    /// error at load time.
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.steps.is_empty() {
            return Err(WorkflowError::InvalidDefinition(
                "workflow must have at least one step".into(),
            ));
        }

        let mut seen_ids = HashSet::new();
        for step in &self.steps {
            if !seen_ids.insert(&step.id) {
                return Err(WorkflowError::InvalidDefinition(format!(
                    "duplicate step id '{}'",
                    step.id
                )));
            }
        }

        let mut orders: Vec<usize> = self.steps.iter().map(|s| s.order).collect();
        orders.sort_unstable();
        for (expected, actual) in orders.iter().enumerate() {
            if expected != *actual {
                return Err(WorkflowError::InvalidDefinition(format!(
                    "step orders must form a contiguous 0-based sequence (missing order {})",
                    expected
                )));
            }
        }

        if !self.steps.iter().any(|s| s.required) {
            return Err(WorkflowError::InvalidDefinition(
                "workflow must have at least one required step".into(),
            ));
        }

        Ok(())
    }
}
