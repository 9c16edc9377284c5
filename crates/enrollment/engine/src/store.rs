//! Persistence adapter contract
//!
//! Durable storage is owned by the caller, not the engine; this module
//! specifies the contract the engine relies on and ships an in-memory
//! reference adapter for tests. `save` must be all-or-nothing: a
//! partially written instance must never be observable by a later
//! `load`.

use enrollment_types::{SubjectId, WorkflowInstance};
use std::collections::HashMap;

/// Errors surfaced by a persistence adapter
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No instance stored for the subject
    #[error("no enrollment instance stored for subject '{0}'")]
    NotFound(SubjectId),

    /// The saved instance's version does not follow the stored one.
    /// The caller must reload and reapply.
    #[error("version conflict: expected {expected}, got {actual}")]
    Conflict { expected: u64, actual: u64 },
}

/// Contract between the engine's caller and durable storage.
///
/// `save` accepts a first write for a subject unconditionally and
/// thereafter only an instance whose version is exactly one greater
/// than the stored version — the same optimistic-concurrency invariant
/// the engine enforces in memory.
pub trait InstanceStore {
    fn load(&self, subject_id: &SubjectId) -> Result<WorkflowInstance, StoreError>;
    fn save(&mut self, instance: &WorkflowInstance) -> Result<(), StoreError>;
}

/// In-process reference adapter
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    instances: HashMap<SubjectId, WorkflowInstance>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored instances
    pub fn count(&self) -> usize {
        self.instances.len()
    }
}

impl InstanceStore for MemoryStore {
    fn load(&self, subject_id: &SubjectId) -> Result<WorkflowInstance, StoreError> {
        self.instances
            .get(subject_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(subject_id.clone()))
    }

    fn save(&mut self, instance: &WorkflowInstance) -> Result<(), StoreError> {
        if let Some(stored) = self.instances.get(&instance.subject_id) {
            let expected = stored.version + 1;
            if instance.version != expected {
                return Err(StoreError::Conflict {
                    expected,
                    actual: instance.version,
                });
            }
        }
        self.instances
            .insert(instance.subject_id.clone(), instance.clone());
        Ok(())
    }
}
