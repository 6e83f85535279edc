//! Entity (vertex) in the graph.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use super::Attributes;

/// Globally unique entity identity, e.g. `"user:7"` or `"post:7"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `"<kind-tag>:<source-id>"`.
    pub fn tagged(tag: &str, source_id: impl std::fmt::Display) -> Self {
        Self(format!("{tag}:{source_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Identifies the store instance an [`Entity`] handle was obtained from.
///
/// `StoreId(0)` means "detached": the entity was built or deserialized
/// outside any store and cannot be used as a relationship endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StoreId(pub(crate) u64);

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

impl StoreId {
    pub const DETACHED: StoreId = StoreId(0);

    /// Allocate a process-unique store id.
    pub(crate) fn fresh() -> Self {
        Self(NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn is_detached(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for StoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store#{}", self.0)
    }
}

/// An entity: one ingested record (a person, a post, ...).
///
/// Values returned by a store double as handles for
/// `GraphStore::create_relationship`. Equality compares content only;
/// the originating store is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Descriptive kind label (`"User"`, `"Post"`). Not part of identity.
    #[serde(rename = "type")]
    pub entity_type: String,
    pub attributes: Attributes,
    #[serde(skip)]
    origin: StoreId,
}

impl Entity {
    /// A detached entity, not yet owned by any store.
    pub fn new(id: impl Into<EntityId>, entity_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            attributes: Attributes::new(),
            origin: StoreId::DETACHED,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub(crate) fn attached(mut self, origin: StoreId) -> Self {
        self.origin = origin;
        self
    }

    /// The store this handle came from.
    pub fn origin(&self) -> StoreId {
        self.origin
    }

    pub fn is_type(&self, entity_type: &str) -> bool {
        self.entity_type == entity_type
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.entity_type == other.entity_type
            && self.attributes == other.attributes
    }
}
