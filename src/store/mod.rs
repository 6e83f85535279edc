//! # Graph Store Trait
//!
//! This is THE contract between the ingestion driver (or any other caller)
//! and the entity graph. It covers entity creation, lookup by identity,
//! relationship creation, and ordered read access.
//!
//! All operations are synchronous and in-memory. Implementations must make
//! each mutating call atomic with respect to every other call, so a store
//! can be shared between logically concurrent callbacks.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | Arena + hash index behind one lock |

pub mod memory;

use serde::{Deserialize, Serialize};
use crate::model::*;
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// Store Configuration
// ============================================================================

/// What `put_entity` does when the id is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Replace type and attributes in place; last write wins.
    #[default]
    Overwrite,
    /// Fail with `Error::DuplicateEntity` and leave the store untouched.
    Reject,
}

/// Configuration for a graph store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub duplicate_policy: DuplicatePolicy,
}

impl StoreConfig {
    /// Reject duplicate entity ids instead of overwriting.
    pub fn strict() -> Self {
        Self { duplicate_policy: DuplicatePolicy::Reject }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

// ============================================================================
// Write outcome
// ============================================================================

/// Whether an entity write inserted a new identity or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    Created,
    Overwritten,
}

/// Result of `put_entity`: the stored entity plus what happened.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityWrite {
    pub entity: Entity,
    pub outcome: WriteOutcome,
}

// ============================================================================
// GraphStore Trait
// ============================================================================

/// The entity graph contract.
///
/// Lookup misses are data (`None`), not errors. The only failures are
/// contract violations: malformed input, dangling relationship endpoints,
/// and duplicates under `DuplicatePolicy::Reject`.
pub trait GraphStore: Send + Sync + 'static {
    // ========================================================================
    // Entities
    // ========================================================================

    /// Create or overwrite the entity with `id`, reporting which happened.
    ///
    /// Overwriting keeps the entity's position in creation order.
    fn put_entity(
        &self,
        id: EntityId,
        entity_type: &str,
        attributes: Attributes,
    ) -> Result<EntityWrite>;

    /// Create the entity with `id` (or overwrite it, per policy) and return it.
    ///
    /// Afterwards `find_entity_by_id(&id)` returns an equal entity.
    fn create_entity(
        &self,
        id: impl Into<EntityId>,
        entity_type: &str,
        attributes: Attributes,
    ) -> Result<Entity>
    where
        Self: Sized,
    {
        self.put_entity(id.into(), entity_type, attributes).map(|w| w.entity)
    }

    /// Look up an entity by id. `None` if it was never created.
    fn find_entity_by_id(&self, id: &EntityId) -> Option<Entity>;

    fn contains_entity(&self, id: &EntityId) -> bool {
        self.find_entity_by_id(id).is_some()
    }

    // ========================================================================
    // Relationships
    // ========================================================================

    /// Record a directed edge `from -[label]-> to`.
    ///
    /// Both endpoints must be handles obtained from this store whose ids are
    /// present; otherwise `Error::InvalidReference`. Identical edges are not
    /// deduplicated.
    fn create_relationship(
        &self,
        from: &Entity,
        to: &Entity,
        label: &str,
    ) -> Result<Relationship>;

    // ========================================================================
    // Scan
    // ========================================================================

    /// All entities in creation order.
    fn entities(&self) -> Vec<Entity>;

    /// All relationships in creation order.
    fn relationships(&self) -> Vec<Relationship>;

    fn entity_count(&self) -> usize;

    fn relationship_count(&self) -> usize;

    /// Entities of one type, in creation order.
    ///
    /// Default: filters `entities()`.
    fn entities_by_type(&self, entity_type: &str) -> Vec<Entity> {
        self.entities()
            .into_iter()
            .filter(|e| e.is_type(entity_type))
            .collect()
    }

    /// Relationships touching `entity` in the given direction.
    ///
    /// Default: filters `relationships()`.
    fn relationships_of(&self, entity: &EntityId, dir: Direction) -> Vec<Relationship> {
        self.relationships()
            .into_iter()
            .filter(|r| r.touches(entity, dir))
            .collect()
    }

    /// Relationships with the given label, in creation order.
    fn relationships_by_label(&self, label: &str) -> Vec<Relationship> {
        self.relationships()
            .into_iter()
            .filter(|r| r.label == label)
            .collect()
    }

    // ========================================================================
    // Schema introspection
    // ========================================================================

    /// All distinct entity types, sorted.
    fn entity_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.entities().into_iter().map(|e| e.entity_type).collect();
        types.sort();
        types.dedup();
        types
    }

    /// All distinct relationship labels, sorted.
    fn relationship_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.relationships().into_iter().map(|r| r.label).collect();
        labels.sort();
        labels.dedup();
        labels
    }
}
