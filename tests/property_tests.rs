//! Property-based tests for the graph store.
//!
//! Invariants checked for arbitrary operation sequences:
//! - at most one stored entity per id, reflecting the latest write
//! - lookups hit exactly the ids that were created
//! - every relationship endpoint is retrievable

use std::collections::HashMap;

use entity_graph::{Attributes, Direction, GraphStore, MemoryStore};
use proptest::prelude::*;
use serde_json::json;

/// Small id space so sequences collide often.
fn arb_id() -> impl Strategy<Value = String> {
    (prop::sample::select(vec!["user", "post"]), 0u8..12).prop_map(|(tag, n)| format!("{tag}:{n}"))
}

fn arb_type() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["User", "Post", "Admin"]).prop_map(String::from)
}

fn arb_write() -> impl Strategy<Value = (String, String, i64)> {
    (arb_id(), arb_type(), any::<i64>())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn latest_write_wins_and_ids_stay_unique(writes in prop::collection::vec(arb_write(), 0..60)) {
        let store = MemoryStore::new();
        let mut expected: HashMap<String, (String, i64)> = HashMap::new();

        for (id, ty, n) in &writes {
            let mut attrs = Attributes::new();
            attrs.insert("n".into(), json!(n));
            store.create_entity(id.as_str(), ty, attrs).unwrap();
            expected.insert(id.clone(), (ty.clone(), *n));
        }

        prop_assert_eq!(store.entity_count(), expected.len());

        let all = store.entities();
        let mut seen = std::collections::HashSet::new();
        for e in &all {
            prop_assert!(seen.insert(e.id.clone()), "duplicate id {}", e.id);
        }

        for (id, (ty, n)) in &expected {
            let found = store.find_entity_by_id(&id.as_str().into());
            prop_assert!(found.is_some());
            let found = found.unwrap();
            prop_assert_eq!(&found.entity_type, ty);
            prop_assert_eq!(found.get("n"), Some(&json!(n)));
        }
    }

    #[test]
    fn lookup_misses_for_unseen_ids(
        created in prop::collection::hash_set(arb_id(), 0..20),
        probe in arb_id(),
    ) {
        let store = MemoryStore::new();
        for id in &created {
            store.create_entity(id.as_str(), "User", Attributes::new()).unwrap();
        }
        let hit = store.find_entity_by_id(&probe.as_str().into()).is_some();
        prop_assert_eq!(hit, created.contains(&probe));
    }

    #[test]
    fn relationship_endpoints_always_resolve(
        ids in prop::collection::vec(arb_id(), 1..20),
        edges in prop::collection::vec((any::<prop::sample::Index>(), any::<prop::sample::Index>()), 0..40),
    ) {
        let store = MemoryStore::new();
        let handles: Vec<_> = ids.iter()
            .map(|id| store.create_entity(id.as_str(), "Node", Attributes::new()).unwrap())
            .collect();

        for (a, b) in &edges {
            let from = a.get(&handles);
            let to = b.get(&handles);
            store.create_relationship(from, to, "LINK").unwrap();
        }

        prop_assert_eq!(store.relationship_count(), edges.len());
        for rel in store.relationships() {
            prop_assert!(store.find_entity_by_id(&rel.from).is_some());
            prop_assert!(store.find_entity_by_id(&rel.to).is_some());
            prop_assert!(store.relationships_of(&rel.from, Direction::Outgoing).contains(&rel));
            prop_assert!(store.relationships_of(&rel.to, Direction::Incoming).contains(&rel));
        }
    }
}
