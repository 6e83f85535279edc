//! Relationship (directed, labeled edge) between two entities.

use serde::{Deserialize, Serialize};
use super::EntityId;

/// Relationship identifier, assigned sequentially by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelId(pub u64);

impl std::fmt::Display for RelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of a relationship an entity sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// A directed, labeled edge. Endpoints are stored by id.
///
/// Relationships carry no uniqueness constraint: two edges with the same
/// `(from, to, label)` are distinct and differ only by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelId,
    pub from: EntityId,
    pub to: EntityId,
    pub label: String,
}

impl Relationship {
    pub fn new(id: RelId, from: EntityId, to: EntityId, label: impl Into<String>) -> Self {
        Self { id, from, to, label: label.into() }
    }

    /// Whether this edge touches `entity` in the given direction.
    pub fn touches(&self, entity: &EntityId, dir: Direction) -> bool {
        match dir {
            Direction::Outgoing => self.from == *entity,
            Direction::Incoming => self.to == *entity,
            Direction::Both => self.from == *entity || self.to == *entity,
        }
    }

    /// Same endpoints and label, ignoring `id`.
    pub fn same_edge(&self, from: &EntityId, to: &EntityId, label: &str) -> bool {
        self.from == *from && self.to == *to && self.label == label
    }
}
