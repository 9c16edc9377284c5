//! Domain types for the sequential provider-enrollment workflow engine
//!
//! A workflow is a finite, ordered list of steps — some mandatory, some
//! optional — each capturing its own payload. These types are pure data:
//! definitions are immutable once validated, and instances are
//! externally-owned values the engine transforms with pure functions.
//!
//! - [`WorkflowDefinition`] / [`StepDefinition`] — the blueprint
//! - [`PayloadShape`] — per-step schema for captured data
//! - [`WorkflowInstance`] / [`StepState`] — one subject's progress
//! - [`WorkflowError`] — the full error taxonomy

#![deny(unsafe_code)]

pub mod definition;
pub mod error;
pub mod instance;
pub mod payload;

pub use definition::{StepDefinition, StepId, WorkflowDefinition, WorkflowDefinitionId};
pub use error::{WorkflowError, WorkflowResult};
pub use instance::{StepState, StepStatus, SubjectId, WorkflowInstance};
pub use payload::{FieldSpec, FieldType, PayloadShape, StepPayload};
