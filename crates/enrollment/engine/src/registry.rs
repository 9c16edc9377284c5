//! Definition registry: the static catalogue of workflow definitions
//!
//! Definitions are validated on registration and treated as read-only
//! for the lifetime of the process. A definition that fails validation
//! is never stored, so no instance can be created against it.

use enrollment_types::{WorkflowDefinition, WorkflowDefinitionId, WorkflowError, WorkflowResult};
use std::collections::HashMap;

/// Registry of validated workflow definitions
#[derive(Clone, Debug, Default)]
pub struct DefinitionRegistry {
    /// All registered definitions, keyed by id
    definitions: HashMap<WorkflowDefinitionId, WorkflowDefinition>,
}

impl DefinitionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workflow definition.
    ///
    /// Validates the definition first and fails fast on a structural
    /// violation. Returns the definition id.
    pub fn register(
        &mut self,
        definition: WorkflowDefinition,
    ) -> WorkflowResult<WorkflowDefinitionId> {
        definition.validate()?;

        let id = definition.id.clone();
        self.definitions.insert(id.clone(), definition);

        tracing::info!(definition_id = %id, "Workflow definition registered");
        Ok(id)
    }

    /// Get a definition by id
    pub fn definition_for(&self, id: &WorkflowDefinitionId) -> WorkflowResult<&WorkflowDefinition> {
        self.definitions
            .get(id)
            .ok_or_else(|| WorkflowError::UnknownDefinition(id.clone()))
    }

    /// List all registered definitions
    pub fn list(&self) -> Vec<&WorkflowDefinition> {
        self.definitions.values().collect()
    }

    /// Total number of registered definitions
    pub fn count(&self) -> usize {
        self.definitions.len()
    }

    /// Check if a definition is registered
    pub fn contains(&self, id: &WorkflowDefinitionId) -> bool {
        self.definitions.contains_key(id)
    }
}
