//! Graph export: JSON snapshots and Cypher DUMP scripts.
//!
//! ```text
//! GraphStore → snapshot()            → GraphSnapshot (serde)
//!            → export_json()         → pretty JSON document
//!            → export_cypher_dump()  → CREATE / MATCH…CREATE statements
//! ```
//!
//! Entities and relationships are written in creation order and attribute
//! keys come out sorted, so exporting the same graph twice gives identical
//! output.

use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::*;
use crate::store::GraphStore;
use crate::Result;

/// A point-in-time copy of a store's contents.
///
/// Entities read back from a snapshot are detached: they cannot be used as
/// relationship endpoints in any store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

impl GraphSnapshot {
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == *id)
    }
}

/// Copy the store's entities and relationships, both in creation order.
pub fn snapshot<S: GraphStore + ?Sized>(store: &S) -> GraphSnapshot {
    GraphSnapshot {
        entities: store.entities(),
        relationships: store.relationships(),
    }
}

/// Write the store as a pretty-printed JSON snapshot.
pub fn export_json<S: GraphStore + ?Sized>(store: &S, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &snapshot(store))?;
    writeln!(writer)?;
    Ok(())
}

/// Write the store as a Cypher DUMP script.
///
/// Each entity becomes a `CREATE` carrying its id as `_id`; each
/// relationship becomes a `MATCH … CREATE` between those ids.
pub fn export_cypher_dump<S: GraphStore + ?Sized>(store: &S, writer: &mut dyn Write) -> Result<()> {
    let snap = snapshot(store);

    // Header
    writeln!(writer, "// entity-graph Cypher DUMP")?;
    writeln!(writer, "// Entities: {}", snap.entities.len())?;
    writeln!(writer, "// Relationships: {}", snap.relationships.len())?;
    writeln!(writer)?;

    for entity in &snap.entities {
        let props_str = format_properties(&entity.attributes);
        writeln!(
            writer,
            "CREATE (n:{} {{_id: {}{}}});",
            format_identifier(&entity.entity_type),
            format_string(entity.id.as_str()),
            if props_str.is_empty() { String::new() } else { format!(", {}", props_str) }
        )?;
    }

    writeln!(writer)?;
    writeln!(writer, "// Relationships")?;

    for rel in &snap.relationships {
        writeln!(
            writer,
            "MATCH (a {{_id: {}}}), (b {{_id: {}}}) CREATE (a)-[:{}]->(b);",
            format_string(rel.from.as_str()),
            format_string(rel.to.as_str()),
            format_identifier(&rel.label),
        )?;
    }

    Ok(())
}

/// Format attributes as a Cypher property string (key: value, ...).
///
/// Keys starting with `_` are reserved for the dump itself and skipped.
fn format_properties(attributes: &Attributes) -> String {
    let mut parts = Vec::new();
    for (key, value) in attributes.iter() {
        if key.starts_with('_') {
            continue;
        }
        parts.push(format!("{}: {}", format_identifier(key), format_value(value)));
    }
    parts.join(", ")
}

/// Format a JSON value as a Cypher literal.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format_string(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(m) => {
            let inner: Vec<String> = m.iter()
                .map(|(k, v)| format!("{}: {}", format_identifier(k), format_value(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

fn format_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Backtick-quote identifiers that are not plain `[A-Za-z_][A-Za-z0-9_]*`.
fn format_identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}
