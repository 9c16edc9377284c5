//! Sequential enrollment workflow engine
//!
//! A finite, ordered set of steps — some mandatory, some optional — each
//! capturing its own data, with transition guards that prevent skipping
//! required work and a finalization gate that only opens once every
//! required step is satisfied.
//!
//! # Key Principle
//!
//! **The engine guards transitions, it never performs I/O.**
//!
//! Every operation is a pure function from `(current instance, input)` to
//! `(new instance | error)`. Durability belongs to the caller, behind the
//! [`InstanceStore`] contract; concurrent callers are arbitrated with the
//! instance's optimistic-concurrency version.
//!
//! # Architecture
//!
//! - [`DefinitionRegistry`] — static catalogue of validated definitions
//! - [`InstanceController`] — the state machine: active-step pointer,
//!   transition guards, snapshots
//! - [`FinalizationGate`] — terminal predicate plus the sealing transition
//! - [`InstanceStore`] — contract with the external persistence adapter
//! - [`provider_enrollment`] — the built-in IHSS enrollment sequence
//!
//! # Example
//!
//! ```rust
//! use enrollment_engine::{provider_enrollment, FinalizationGate, InstanceController};
//! use enrollment_types::{StepId, SubjectId};
//!
//! let definition = provider_enrollment();
//! let controller = InstanceController::new(definition.clone()).unwrap();
//! let gate = FinalizationGate::new(definition).unwrap();
//!
//! let instance = controller.start(SubjectId::new("provider-4821"));
//! assert_eq!(instance.active_step_id, Some(StepId::new("soc426")));
//!
//! let payload = serde_json::json!({ "signed_date": "2025-03-03" });
//! let instance = controller
//!     .complete_step(
//!         &instance,
//!         0,
//!         &StepId::new("soc426"),
//!         payload.as_object().cloned().unwrap(),
//!     )
//!     .unwrap();
//!
//! assert_eq!(instance.version, 1);
//! assert!(!gate.can_finalize(&instance));
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod controller;
pub mod gate;
pub mod registry;
pub mod store;

// Re-export main types
pub use catalog::provider_enrollment;
pub use controller::{InstanceController, Snapshot};
pub use gate::FinalizationGate;
pub use registry::DefinitionRegistry;
pub use store::{InstanceStore, MemoryStore, StoreError};
