//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`: an arena of
//! entities in creation order, a hash index from id to arena slot, and an
//! append-only relationship list.
//!
//! ## Concurrency
//!
//! Entities, relationships and both indexes live behind a single `RwLock`, so every mutation
//! is applied atomically. Readers never observe a half-inserted entity or a
//! relationship whose endpoints are missing. Clones share the same graph.
//!
//! ## Limitations
//!
//! - **No deletion**: entities and relationships live until the store is dropped.
//! - **No label index**: `relationships_by_label()` and `entities_by_type()`
//!   scan everything.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::model::*;
use crate::{Error, Result};
use super::{DuplicatePolicy, EntityWrite, GraphStore, StoreConfig, WriteOutcome};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory entity graph.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    id: StoreId,
    config: StoreConfig,
    state: RwLock<GraphState>,
}

#[derive(Default)]
struct GraphState {
    /// Creation order. Slots never move.
    entities: Vec<Entity>,
    /// entity id → slot in `entities`
    index: HashMap<EntityId, usize>,
    relationships: Vec<Relationship>,
    /// entity id → slots in `relationships` touching it
    adjacency: HashMap<EntityId, Vec<usize>>,
    next_rel_id: u64,
}

impl MemoryStore {
    /// Empty store with the default (overwrite) duplicate policy.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                id: StoreId::fresh(),
                config,
                state: RwLock::new(GraphState {
                    next_rel_id: 1,
                    ..GraphState::default()
                }),
            }),
        }
    }

    /// Identity of this store instance; carried by every handle it returns.
    pub fn store_id(&self) -> StoreId {
        self.inner.id
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    fn check_endpoint(&self, state: &GraphState, entity: &Entity) -> Result<()> {
        if entity.origin() != self.inner.id {
            let reason = if entity.origin().is_detached() {
                "entity was not obtained from a store".to_string()
            } else {
                format!("entity belongs to {}, not {}", entity.origin(), self.inner.id)
            };
            return Err(Error::InvalidReference { id: entity.id.clone(), reason });
        }
        if !state.index.contains_key(&entity.id) {
            return Err(Error::InvalidReference {
                id: entity.id.clone(),
                reason: "entity is not present in this store".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("MemoryStore")
            .field("id", &self.inner.id)
            .field("duplicate_policy", &self.inner.config.duplicate_policy)
            .field("entities", &state.entities.len())
            .field("relationships", &state.relationships.len())
            .finish()
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

impl GraphStore for MemoryStore {
    fn put_entity(
        &self,
        id: EntityId,
        entity_type: &str,
        attributes: Attributes,
    ) -> Result<EntityWrite> {
        if id.is_empty() {
            return Err(Error::InvalidInput("entity id must not be empty".into()));
        }
        if entity_type.is_empty() {
            return Err(Error::InvalidInput(format!("entity {id} has an empty type")));
        }

        let mut guard = self.inner.state.write();
        let state = &mut *guard;

        if let Some(&slot) = state.index.get(&id) {
            if self.inner.config.duplicate_policy == DuplicatePolicy::Reject {
                return Err(Error::DuplicateEntity(id));
            }
            let entity = &mut state.entities[slot];
            debug!(id = %id, old_type = %entity.entity_type, new_type = entity_type, "overwriting entity");
            entity.entity_type = entity_type.to_string();
            entity.attributes = attributes;
            return Ok(EntityWrite {
                entity: entity.clone(),
                outcome: WriteOutcome::Overwritten,
            });
        }

        let entity = Entity::new(id.clone(), entity_type)
            .with_attributes(attributes)
            .attached(self.inner.id);
        state.index.insert(id, state.entities.len());
        state.entities.push(entity.clone());

        Ok(EntityWrite { entity, outcome: WriteOutcome::Created })
    }

    fn find_entity_by_id(&self, id: &EntityId) -> Option<Entity> {
        let state = self.inner.state.read();
        state.index.get(id).map(|&slot| state.entities[slot].clone())
    }

    fn contains_entity(&self, id: &EntityId) -> bool {
        self.inner.state.read().index.contains_key(id)
    }

    fn create_relationship(
        &self,
        from: &Entity,
        to: &Entity,
        label: &str,
    ) -> Result<Relationship> {
        if label.is_empty() {
            return Err(Error::InvalidInput(format!(
                "relationship {} -> {} has an empty label", from.id, to.id
            )));
        }

        let mut state = self.inner.state.write();
        self.check_endpoint(&state, from)?;
        self.check_endpoint(&state, to)?;

        let rel = Relationship::new(RelId(state.next_rel_id), from.id.clone(), to.id.clone(), label);
        state.next_rel_id += 1;

        // Update adjacency for both endpoints
        let slot = state.relationships.len();
        state.adjacency.entry(rel.from.clone()).or_default().push(slot);
        if rel.from != rel.to {
            state.adjacency.entry(rel.to.clone()).or_default().push(slot);
        }
        state.relationships.push(rel.clone());

        Ok(rel)
    }

    // ========================================================================
    // Scan
    // ========================================================================

    fn entities(&self) -> Vec<Entity> {
        self.inner.state.read().entities.clone()
    }

    fn relationships(&self) -> Vec<Relationship> {
        self.inner.state.read().relationships.clone()
    }

    fn entity_count(&self) -> usize {
        self.inner.state.read().entities.len()
    }

    fn relationship_count(&self) -> usize {
        self.inner.state.read().relationships.len()
    }

    fn entities_by_type(&self, entity_type: &str) -> Vec<Entity> {
        self.inner.state.read().entities.iter()
            .filter(|e| e.is_type(entity_type))
            .cloned()
            .collect()
    }

    fn relationships_of(&self, entity: &EntityId, dir: Direction) -> Vec<Relationship> {
        let state = self.inner.state.read();
        let Some(slots) = state.adjacency.get(entity) else {
            return Vec::new();
        };
        slots.iter()
            .map(|&slot| &state.relationships[slot])
            .filter(|r| r.touches(entity, dir))
            .cloned()
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
