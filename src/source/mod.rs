//! # Record Sources
//!
//! A record source fetches every record of one kind (`"users"`, `"posts"`)
//! and hands them to a callback, one at a time, in listing order.
//!
//! Sources never return transport errors. A failed fetch is logged and
//! reported as [`FetchOutcome::Failed`], together with however many records
//! were delivered before the failure. Callers decide what to do with a
//! partial or empty run; the graph store never sees the error.
//!
//! | Source | Module | Description |
//! |--------|--------|-------------|
//! | `FixtureSource` | `fixture` | Records held in memory, optional injected failures |
//! | `HttpSource` | `http` | Paged JSON listings over HTTP (feature `http`) |

pub mod fixture;
#[cfg(feature = "http")]
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::model::Record;

pub use fixture::FixtureSource;
#[cfg(feature = "http")]
pub use http::{HttpSource, SourceConfig};

// ============================================================================
// Errors
// ============================================================================

/// Why a fetch failed. Only ever surfaced as the diagnostic of a
/// [`FetchOutcome::Failed`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unexpected payload shape: {0}")]
    UnexpectedShape(String),

    #[error("paging not honored: {0}")]
    Paging(String),

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid source configuration: {0}")]
    Config(String),
}

// ============================================================================
// Fetch outcome
// ============================================================================

/// How a `fetch_and_iterate` call ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Every available record was delivered.
    Complete { delivered: usize, pages: usize },
    /// The fetch stopped early. Records delivered before the failure stand.
    Failed { delivered: usize, pages: usize, diagnostic: String },
}

impl FetchOutcome {
    /// Log a swallowed error and turn it into a `Failed` outcome.
    pub fn failed(kind: &str, delivered: usize, pages: usize, err: &SourceError) -> Self {
        warn!(kind, delivered, pages, error = %err, "record fetch failed");
        FetchOutcome::Failed { delivered, pages, diagnostic: err.to_string() }
    }

    pub fn delivered(&self) -> usize {
        match self {
            FetchOutcome::Complete { delivered, .. } | FetchOutcome::Failed { delivered, .. } => *delivered,
        }
    }

    pub fn pages(&self) -> usize {
        match self {
            FetchOutcome::Complete { pages, .. } | FetchOutcome::Failed { pages, .. } => *pages,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, FetchOutcome::Complete { .. })
    }

    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            FetchOutcome::Failed { diagnostic, .. } => Some(diagnostic),
            FetchOutcome::Complete { .. } => None,
        }
    }
}

// ============================================================================
// RecordSource Trait
// ============================================================================

/// Capability: fetch a collection of records and invoke a callback per record.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Deliver every record of `kind` to `on_record` exactly once, in
    /// listing order, and resolve only after the last one was delivered.
    async fn fetch_and_iterate(
        &self,
        kind: &str,
        on_record: &mut (dyn FnMut(Record) + Send),
    ) -> FetchOutcome;
}

#[async_trait]
impl<T: RecordSource + ?Sized> RecordSource for &T {
    async fn fetch_and_iterate(
        &self,
        kind: &str,
        on_record: &mut (dyn FnMut(Record) + Send),
    ) -> FetchOutcome {
        (**self).fetch_and_iterate(kind, on_record).await
    }
}

#[async_trait]
impl<T: RecordSource + ?Sized> RecordSource for std::sync::Arc<T> {
    async fn fetch_and_iterate(
        &self,
        kind: &str,
        on_record: &mut (dyn FnMut(Record) + Send),
    ) -> FetchOutcome {
        (**self).fetch_and_iterate(kind, on_record).await
    }
}

// ============================================================================
// Payload helpers
// ============================================================================

/// Split a listing payload (a JSON array) into object records.
///
/// Non-object elements are dropped with a warning.
pub(crate) fn split_records(kind: &str, payload: Value) -> Result<Vec<Record>, SourceError> {
    let items = match payload {
        Value::Array(items) => items,
        other => {
            return Err(SourceError::UnexpectedShape(format!(
                "expected a JSON array of {kind}, got {}", json_type_name(&other)
            )));
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (position, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(record) => records.push(record),
            other => warn!(kind, position, found = json_type_name(&other), "skipping non-object record"),
        }
    }
    Ok(records)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
