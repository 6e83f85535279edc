//! # Ingestion Driver
//!
//! Sequences the two record sources into one graph:
//!
//! ```text
//! users source ──(await every record)──► User entities
//! posts source ──(await every record)──► Post entities
//!                                        └─ author found? ─► (User)-[:HAS]->(Post)
//! ```
//!
//! People are ingested completely before the first post, so every author
//! that exists at all is already in the store when its posts arrive. A post
//! whose author is missing is kept as an orphan: the entity is created, no
//! relationship is, and nothing fails.
//!
//! Fetch failures are reported in the [`IngestReport`], never as errors.
//! Only store contract violations (a duplicate under `DuplicatePolicy::Reject`,
//! malformed input) abort a run.

pub mod identity;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::*;
use crate::source::{FetchOutcome, RecordSource};
use crate::store::{GraphStore, WriteOutcome};
use crate::{Error, Result};

pub use identity::{post_entity_id, source_id, user_entity_id, POST_TAG, USER_TAG};

// ============================================================================
// Configuration
// ============================================================================

/// Resource kinds, entity types and relationship label used by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub users_kind: String,
    pub posts_kind: String,
    pub user_type: String,
    pub post_type: String,
    pub relationship_label: String,
    /// Skip creating an author → post edge that already exists.
    pub skip_existing_edges: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            users_kind: "users".into(),
            posts_kind: "posts".into(),
            user_type: "User".into(),
            post_type: "Post".into(),
            relationship_label: "HAS".into(),
            skip_existing_edges: true,
        }
    }
}

impl IngestConfig {
    pub fn with_kinds(mut self, users: impl Into<String>, posts: impl Into<String>) -> Self {
        self.users_kind = users.into();
        self.posts_kind = posts.into();
        self
    }

    pub fn with_relationship_label(mut self, label: impl Into<String>) -> Self {
        self.relationship_label = label.into();
        self
    }

    pub fn with_skip_existing_edges(mut self, skip: bool) -> Self {
        self.skip_existing_edges = skip;
        self
    }
}

// ============================================================================
// Reports
// ============================================================================

/// What happened to one source's records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    pub outcome: FetchOutcome,
    pub created: usize,
    pub overwritten: usize,
    /// Records without a usable `id`; never handed to the store.
    pub skipped: usize,
}

#[derive(Debug, Default)]
struct Tally {
    created: usize,
    overwritten: usize,
    skipped: usize,
}

impl Tally {
    fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Created => self.created += 1,
            WriteOutcome::Overwritten => self.overwritten += 1,
        }
    }

    fn finish(self, outcome: FetchOutcome) -> SourceReport {
        SourceReport {
            outcome,
            created: self.created,
            overwritten: self.overwritten,
            skipped: self.skipped,
        }
    }
}

/// Summary of one ingestion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub users: SourceReport,
    pub posts: SourceReport,
    /// Relationships created by this run.
    pub relationships: usize,
    /// Posts whose author entity was not found.
    pub orphaned_posts: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl IngestReport {
    /// Both sources delivered every record.
    pub fn is_complete(&self) -> bool {
        self.users.outcome.is_complete() && self.posts.outcome.is_complete()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

// ============================================================================
// Ingestor
// ============================================================================

/// Drives a users source and a posts source into a graph store.
pub struct Ingestor<S, U, P = U> {
    store: S,
    users: U,
    posts: P,
    config: IngestConfig,
}

impl<S, U, P> Ingestor<S, U, P>
where
    S: GraphStore,
    U: RecordSource,
    P: RecordSource,
{
    pub fn new(store: S, users: U, posts: P) -> Self {
        Self { store, users, posts, config: IngestConfig::default() }
    }

    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Ingest people, then posts. Safe to call again on the same store.
    pub async fn run(&self) -> Result<IngestReport> {
        let started_at = Utc::now();
        let users = self.ingest_users().await?;
        let (posts, relationships, orphaned_posts) = self.ingest_posts().await?;
        let finished_at = Utc::now();

        let report = IngestReport { users, posts, relationships, orphaned_posts, started_at, finished_at };
        info!(
            users = report.users.created + report.users.overwritten,
            posts = report.posts.created + report.posts.overwritten,
            relationships,
            orphaned_posts,
            complete = report.is_complete(),
            "ingestion finished"
        );
        Ok(report)
    }

    /// One `User` entity per person record.
    pub async fn ingest_users(&self) -> Result<SourceReport> {
        let config = &self.config;
        let store = &self.store;
        let mut tally = Tally::default();
        let mut failure: Option<Error> = None;

        let outcome = self.users.fetch_and_iterate(&config.users_kind, &mut |record: Record| {
            if failure.is_some() {
                return;
            }
            let Some(id) = record.get("id").and_then(user_entity_id) else {
                warn!(kind = %config.users_kind, "skipping person record without a usable id");
                tally.skipped += 1;
                return;
            };
            match store.put_entity(id, &config.user_type, record) {
                Ok(write) => tally.record(write.outcome),
                Err(err) => failure = Some(err),
            }
        }).await;

        if let Some(err) = failure {
            return Err(err);
        }
        info!(kind = %config.users_kind, created = tally.created, overwritten = tally.overwritten, "people ingested");
        Ok(tally.finish(outcome))
    }

    /// One `Post` entity per post record, plus an author edge when the
    /// author is known. Returns the report, edges created, and orphans.
    pub async fn ingest_posts(&self) -> Result<(SourceReport, usize, usize)> {
        let config = &self.config;
        let mut tally = Tally::default();
        let mut relationships = 0;
        let mut orphans = 0;
        let mut failure: Option<Error> = None;

        let outcome = self.posts.fetch_and_iterate(&config.posts_kind, &mut |record: Record| {
            if failure.is_some() {
                return;
            }
            let Some(id) = record.get("id").and_then(post_entity_id) else {
                warn!(kind = %config.posts_kind, "skipping post record without a usable id");
                tally.skipped += 1;
                return;
            };
            let author_id = record.get("userId").and_then(user_entity_id);

            match self.wire_post(id, author_id, record) {
                Ok((outcome, linked)) => {
                    tally.record(outcome);
                    match linked {
                        Some(true) => relationships += 1,
                        Some(false) => {}
                        None => orphans += 1,
                    }
                }
                Err(err) => failure = Some(err),
            }
        }).await;

        if let Some(err) = failure {
            return Err(err);
        }
        info!(
            kind = %config.posts_kind,
            created = tally.created,
            overwritten = tally.overwritten,
            relationships,
            orphans,
            "posts ingested"
        );
        Ok((tally.finish(outcome), relationships, orphans))
    }

    /// Store one post and link it to its author.
    ///
    /// `linked` is `Some(true)` for a new edge, `Some(false)` when an
    /// identical edge already existed, `None` when the author is unknown.
    fn wire_post(
        &self,
        id: EntityId,
        author_id: Option<EntityId>,
        record: Record,
    ) -> Result<(WriteOutcome, Option<bool>)> {
        let config = &self.config;
        let write = self.store.put_entity(id, &config.post_type, record)?;
        let post = write.entity;

        let Some(author) = author_id.as_ref().and_then(|id| self.store.find_entity_by_id(id)) else {
            debug!(post = %post.id, author = ?author_id, "no author entity for post");
            return Ok((write.outcome, None));
        };

        if config.skip_existing_edges {
            let exists = self.store
                .relationships_of(&author.id, Direction::Outgoing)
                .iter()
                .any(|r| r.same_edge(&author.id, &post.id, &config.relationship_label));
            if exists {
                return Ok((write.outcome, Some(false)));
            }
        }

        self.store.create_relationship(&author, &post, &config.relationship_label)?;
        Ok((write.outcome, Some(true)))
    }
}

// ============================================================================
// Tests
// ============================================================================
