//! # Entity Graph Model
//!
//! Plain DTOs shared by the store, the record sources and the export layer.
//!
//! Design rule: this module is pure data. No I/O, no locks, no async.
//! Relationships refer to entities by [`EntityId`], never by reference, so
//! their validity can always be checked against the owning store.

pub mod entity;
pub mod relationship;
pub mod attributes;

pub use entity::{Entity, EntityId, StoreId};
pub use relationship::{Relationship, RelId, Direction};
pub use attributes::{Attributes, Record};
