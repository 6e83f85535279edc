//! # entity-graph: In-memory Entity/Relationship Graph
//!
//! Ingests people and the short posts they author from two record sources
//! and assembles them into one graph of typed entities joined by labeled,
//! directed relationships.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between the ingestion driver and storage
//! 2. **Plain DTOs**: `Entity`, `Relationship`, `EntityId` cross all boundaries
//! 3. **Edges by id**: relationships name their endpoints, they never borrow them
//! 4. **Transport stays outside**: record sources swallow fetch failures into a
//!    `FetchOutcome`; the store only ever sees well-formed creation calls
//!
//! ## Quick Start
//!
//! ```rust
//! use entity_graph::{GraphStore, MemoryStore, Attributes};
//!
//! # fn example() -> entity_graph::Result<()> {
//! let store = MemoryStore::new();
//! let user = store.create_entity("user:1", "User", Attributes::new())?;
//! let post = store.create_entity("post:1", "Post", Attributes::new())?;
//! store.create_relationship(&user, &post, "HAS")?;
//!
//! assert!(store.find_entity_by_id(&"user:1".into()).is_some());
//! assert_eq!(store.relationship_count(), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Record Sources
//!
//! | Source | Feature | Description |
//! |--------|---------|-------------|
//! | Fixture | (default) | In-memory records, for tests and embedding |
//! | Http | `http` | Paged JSON listings over HTTP |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod store;
pub mod source;
pub mod ingest;
pub mod export;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Entity, EntityId, StoreId, Relationship, RelId, Direction,
    Attributes, Record,
};

// ============================================================================
// Re-exports: Store
// ============================================================================

pub use store::{
    GraphStore, MemoryStore, StoreConfig, DuplicatePolicy,
    WriteOutcome, EntityWrite,
};

// ============================================================================
// Re-exports: Sources and ingestion
// ============================================================================

pub use source::{RecordSource, FetchOutcome, SourceError, FixtureSource};
#[cfg(feature = "http")]
pub use source::{HttpSource, SourceConfig};

pub use ingest::{Ingestor, IngestConfig, IngestReport, SourceReport};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Duplicate entity: {0}")]
    DuplicateEntity(EntityId),

    #[error("Invalid reference to {id}: {reason}")]
    InvalidReference { id: EntityId, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
