//! Export tests: JSON snapshot and Cypher dump of an ingested graph.

use entity_graph::export::{export_cypher_dump, export_json, snapshot, GraphSnapshot};
use entity_graph::{Error, FixtureSource, GraphStore, Ingestor, MemoryStore};
use pretty_assertions::assert_eq;
use serde_json::json;

async fn seed() -> MemoryStore {
    let src = FixtureSource::new()
        .with_records("users", [
            json!({"id": 1, "name": "Leanne Graham", "company": {"catchPhrase": "neural-net"}}),
            json!({"id": 2, "name": "Ervin Howell"}),
        ])
        .with_records("posts", [
            json!({"id": 1, "userId": 1, "title": "it's a title"}),
            json!({"id": 2, "userId": 2, "title": "second"}),
            json!({"id": 3, "userId": 42, "title": "orphan"}),
        ]);
    let ingestor = Ingestor::new(MemoryStore::new(), &src, &src);
    ingestor.run().await.unwrap();
    ingestor.into_store()
}

#[tokio::test]
async fn test_snapshot_matches_store() {
    let store = seed().await;
    let snap = snapshot(&store);

    assert_eq!(snap.entities.len(), 5);
    assert_eq!(snap.relationships.len(), 2);
    let ids: Vec<&str> = snap.entities.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["user:1", "user:2", "post:1", "post:2", "post:3"]);
}

#[tokio::test]
async fn test_json_export_reads_back() {
    let store = seed().await;
    let mut buf = Vec::new();
    export_json(&store, &mut buf).unwrap();

    let back: GraphSnapshot = serde_json::from_slice(&buf).unwrap();
    assert_eq!(back, snapshot(&store));
    assert_eq!(back.entity(&"user:1".into()).unwrap().entity_type, "User");

    // Snapshot entities are detached and cannot be wired into a store.
    let user = back.entity(&"user:1".into()).unwrap();
    let post = back.entity(&"post:3".into()).unwrap();
    assert!(matches!(
        store.create_relationship(user, post, "HAS"),
        Err(Error::InvalidReference { .. })
    ));
}

#[tokio::test]
async fn test_cypher_dump() {
    let store = seed().await;
    let mut buf = Vec::new();
    export_cypher_dump(&store, &mut buf).unwrap();
    let dump = String::from_utf8(buf).unwrap();

    assert!(dump.contains("// Entities: 5"));
    assert!(dump.contains("// Relationships: 2"));
    assert!(dump.contains("CREATE (n:User {_id: 'user:1', company: {catchPhrase: 'neural-net'}, id: 1, name: 'Leanne Graham'});"));
    assert!(dump.contains(r"title: 'it\'s a title'"));
    assert!(dump.contains("MATCH (a {_id: 'user:1'}), (b {_id: 'post:1'}) CREATE (a)-[:HAS]->(b);"));
    assert!(!dump.contains("(b {_id: 'post:3'})"));

    let creates = dump.lines().filter(|l| l.starts_with("CREATE")).count();
    let matches = dump.lines().filter(|l| l.starts_with("MATCH")).count();
    assert_eq!((creates, matches), (5, 2));
}
