//! In-memory record source.
//!
//! Serves fixed record lists per kind. Failures can be injected after a
//! given number of delivered records to reproduce partial fetches.

use async_trait::async_trait;
use hashbrown::HashMap;
use serde_json::Value;
use tracing::info;

use crate::model::Record;
use super::{split_records, FetchOutcome, RecordSource, SourceError};

#[derive(Debug, Clone)]
struct InjectedFailure {
    after: usize,
    message: String,
}

/// Record source backed by in-memory JSON values.
#[derive(Debug, Clone, Default)]
pub struct FixtureSource {
    listings: HashMap<String, Value>,
    failures: HashMap<String, InjectedFailure>,
    page_size: Option<usize>,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `records` for `kind`. Non-object values are skipped on delivery.
    pub fn with_records(mut self, kind: impl Into<String>, records: impl IntoIterator<Item = Value>) -> Self {
        self.listings.insert(kind.into(), Value::Array(records.into_iter().collect()));
        self
    }

    /// Serve a raw listing payload for `kind`, exactly as a remote would.
    pub fn with_payload(mut self, kind: impl Into<String>, payload: Value) -> Self {
        self.listings.insert(kind.into(), payload);
        self
    }

    /// Fail `kind` before any record is delivered.
    pub fn failing(self, kind: impl Into<String>, message: impl Into<String>) -> Self {
        self.failing_after(kind, 0, message)
    }

    /// Fail `kind` once `after` records have been delivered.
    pub fn failing_after(mut self, kind: impl Into<String>, after: usize, message: impl Into<String>) -> Self {
        self.failures.insert(kind.into(), InjectedFailure { after, message: message.into() });
        self
    }

    /// Report deliveries in pages of `size` records.
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size.max(1));
        self
    }
}

#[async_trait]
impl RecordSource for FixtureSource {
    async fn fetch_and_iterate(
        &self,
        kind: &str,
        on_record: &mut (dyn FnMut(Record) + Send),
    ) -> FetchOutcome {
        let failure = self.failures.get(kind);
        let payload = self.listings.get(kind).cloned().unwrap_or(Value::Array(Vec::new()));

        let records = match split_records(kind, payload) {
            Ok(records) => records,
            Err(err) => return FetchOutcome::failed(kind, 0, 0, &err),
        };

        let page_size = self.page_size.unwrap_or(records.len().max(1));
        let mut delivered = 0;
        let mut pages = 0;

        for record in records {
            if let Some(f) = failure.filter(|f| f.after == delivered) {
                return FetchOutcome::failed(kind, delivered, pages, &SourceError::Unavailable(f.message.clone()));
            }
            if delivered % page_size == 0 {
                pages += 1;
            }
            on_record(record);
            delivered += 1;
        }

        if let Some(f) = failure.filter(|f| f.after >= delivered) {
            return FetchOutcome::failed(kind, delivered, pages, &SourceError::Unavailable(f.message.clone()));
        }

        info!(kind, delivered, pages, "fetch complete");
        FetchOutcome::Complete { delivered, pages: pages.max(1) }
    }
}
