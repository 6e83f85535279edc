//! End-to-end ingestion tests.
//!
//! Each test drives `Ingestor` with `FixtureSource` records shaped like the
//! real people/posts listings and checks the assembled graph.

use entity_graph::{
    Direction, EntityId, FixtureSource, GraphStore, Ingestor, MemoryStore,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn person(id: i64) -> Value {
    json!({
        "id": id,
        "name": "Leanne Graham",
        "username": "Bret",
        "email": "Sincere@april.biz",
        "address": {
            "street": "Kulas Light",
            "suite": "Apt. 556",
            "city": "Gwenborough",
            "zipcode": "92998-3874",
            "geo": { "lat": "-37.3159", "lng": "81.1496" }
        },
        "phone": "1-770-736-8031 x56442",
        "website": "hildegard.org",
        "company": {
            "name": "Romaguera-Crona",
            "catchPhrase": "Multi-layered client-server neural-net",
            "bs": "harness real-time e-markets"
        }
    })
}

fn post(id: i64, user_id: i64) -> Value {
    json!({
        "userId": user_id,
        "id": id,
        "title": "sunt aut facere repellat provident",
        "body": "quia et suscipit\nsuscipit recusandae"
    })
}

fn source(users: Vec<Value>, posts: Vec<Value>) -> FixtureSource {
    FixtureSource::new().with_records("users", users).with_records("posts", posts)
}

// ============================================================================
// 1. Attributes are stored verbatim
// ============================================================================

#[tokio::test]
async fn test_records_stored_verbatim() {
    let src = source(vec![person(1)], vec![post(1, 1)]);
    let ingestor = Ingestor::new(MemoryStore::new(), &src, &src);
    ingestor.run().await.unwrap();

    let store = ingestor.store();
    let user = store.find_entity_by_id(&"user:1".into()).unwrap();
    assert_eq!(user.entity_type, "User");
    assert_eq!(Value::Object(user.attributes.clone()), person(1));
    assert_eq!(user.get("address").unwrap()["geo"]["lat"], json!("-37.3159"));

    let p = store.find_entity_by_id(&"post:1".into()).unwrap();
    assert_eq!(p.entity_type, "Post");
    assert_eq!(Value::Object(p.attributes), post(1, 1));
}

// ============================================================================
// 2. Same numeric id, different kinds → distinct entities
// ============================================================================

#[tokio::test]
async fn test_kind_tag_separates_identities() {
    let src = source(vec![person(7)], vec![post(7, 7)]);
    let ingestor = Ingestor::new(MemoryStore::new(), &src, &src);
    ingestor.run().await.unwrap();

    let store = ingestor.store();
    assert_eq!(store.entity_count(), 2);
    assert!(store.contains_entity(&EntityId::from("user:7")));
    assert!(store.contains_entity(&EntityId::from("post:7")));
}

// ============================================================================
// 3. Re-running against the same store does not duplicate anything
// ============================================================================

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let src = source(vec![person(1)], vec![post(1, 1)]);
    let ingestor = Ingestor::new(MemoryStore::new(), &src, &src);

    let first = ingestor.run().await.unwrap();
    let second = ingestor.run().await.unwrap();

    assert_eq!(first.relationships, 1);
    assert_eq!(second.relationships, 0);
    assert_eq!(second.users.overwritten, 1);
    assert_eq!(second.posts.overwritten, 1);

    let store = ingestor.store();
    assert_eq!(store.entities_by_type("User").len(), 1);
    assert_eq!(store.entities_by_type("Post").len(), 1);
    let has = store.relationships_by_label("HAS");
    assert_eq!(has.len(), 1);
    assert_eq!(has[0].from.as_str(), "user:1");
    assert_eq!(has[0].to.as_str(), "post:1");
}

// ============================================================================
// 4. Post by an unknown author, no people at all
// ============================================================================

#[tokio::test]
async fn test_single_orphan_post() {
    let src = source(vec![], vec![post(1, 1)]);
    let ingestor = Ingestor::new(MemoryStore::new(), &src, &src);
    let report = ingestor.run().await.unwrap();

    let store = ingestor.store();
    assert_eq!(store.entities_by_type("Post").len(), 1);
    assert_eq!(store.entities_by_type("User").len(), 0);
    assert_eq!(store.relationship_count(), 0);
    assert_eq!(report.orphaned_posts, 1);
}

// ============================================================================
// 5. Mixed: one linked post, one orphan
// ============================================================================

#[tokio::test]
async fn test_orphan_handling() {
    let src = source(vec![person(1)], vec![post(10, 1), post(11, 99)]);
    let ingestor = Ingestor::new(MemoryStore::new(), &src, &src);
    let report = ingestor.run().await.unwrap();

    let store = ingestor.store();
    assert_eq!(store.entities_by_type("User").len(), 1);
    assert_eq!(store.entities_by_type("Post").len(), 2);
    assert_eq!(store.relationship_count(), 1);

    let rel = &store.relationships()[0];
    assert_eq!((rel.from.as_str(), rel.to.as_str()), ("user:1", "post:10"));
    assert!(store.relationships_of(&"post:11".into(), Direction::Both).is_empty());
    assert_eq!(report.orphaned_posts, 1);
    assert_eq!(report.relationships, 1);
}

// ============================================================================
// 6. Separate source instances for people and posts
// ============================================================================

#[tokio::test]
async fn test_two_source_instances() {
    let people = FixtureSource::new().with_records("users", [person(1), person(2)]);
    let posts = FixtureSource::new()
        .with_records("posts", [post(1, 1), post(2, 1), post(3, 2)])
        .with_page_size(2);
    let ingestor = Ingestor::new(MemoryStore::new(), people, posts);
    let report = ingestor.run().await.unwrap();

    assert_eq!(report.posts.outcome.pages(), 2);
    let store = ingestor.store();
    assert_eq!(store.relationships_of(&"user:1".into(), Direction::Outgoing).len(), 2);
    assert_eq!(store.relationships_of(&"user:2".into(), Direction::Outgoing).len(), 1);
}

// ============================================================================
// 7. Transport failures never reach the store
// ============================================================================

#[tokio::test]
async fn test_partial_posts_fetch_keeps_received_records() {
    let src = source(vec![person(1)], vec![post(1, 1), post(2, 1), post(3, 1)])
        .failing_after("posts", 2, "connection reset by peer");
    let ingestor = Ingestor::new(MemoryStore::new(), &src, &src);
    let report = ingestor.run().await.unwrap();

    assert!(!report.is_complete());
    assert!(report.users.outcome.is_complete());
    assert_eq!(report.posts.outcome.delivered(), 2);
    assert_eq!(
        report.posts.outcome.diagnostic(),
        Some("source unavailable: connection reset by peer")
    );

    let store = ingestor.store();
    assert_eq!(store.entities_by_type("Post").len(), 2);
    assert_eq!(store.relationship_count(), 2);
    assert!(store.find_entity_by_id(&"post:3".into()).is_none());
}

#[tokio::test]
async fn test_total_failure_yields_empty_graph() {
    let src = FixtureSource::new()
        .failing("users", "dns error")
        .failing("posts", "dns error");
    let ingestor = Ingestor::new(MemoryStore::new(), &src, &src);
    let report = ingestor.run().await.unwrap();

    assert!(!report.is_complete());
    assert_eq!(ingestor.store().entity_count(), 0);
    assert_eq!(ingestor.store().relationship_count(), 0);
}

// ============================================================================
// 8. Report serializes for the CLI
// ============================================================================

#[tokio::test]
async fn test_report_serializes() {
    let src = source(vec![person(1)], vec![post(1, 1)]);
    let ingestor = Ingestor::new(MemoryStore::new(), &src, &src);
    let report = ingestor.run().await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["users"]["outcome"]["status"], json!("complete"));
    assert_eq!(json["posts"]["created"], json!(1));
    assert_eq!(json["relationships"], json!(1));
    assert!(report.elapsed() >= chrono::Duration::zero());
}
