//! Identity construction for ingested records.
//!
//! A person with source id 7 becomes `"user:7"`, a post with source id 7
//! becomes `"post:7"`. The tag keeps the two id spaces apart.

use serde_json::Value;

use crate::model::EntityId;

pub const USER_TAG: &str = "user";
pub const POST_TAG: &str = "post";

/// Render a source id: integers as decimal, non-empty strings verbatim.
///
/// Anything else (floats, booleans, null, nested values) is not an id.
pub fn source_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

pub fn user_entity_id(id: &Value) -> Option<EntityId> {
    source_id(id).map(|id| EntityId::tagged(USER_TAG, id))
}

pub fn post_entity_id(id: &Value) -> Option<EntityId> {
    source_id(id).map(|id| EntityId::tagged(POST_TAG, id))
}
