//! HTTP record source: JSON listings at `{base_url}/{kind}`.
//!
//! Without a page size, one GET fetches the whole listing. With a page
//! size, pages are requested as `?_page=N&_limit=M` (1-based) until a page
//! comes back empty or short, or `max_pages` is reached. A server that
//! ignores the paging parameters (a page larger than the limit, or a page
//! starting with the same record as the one before) fails the fetch rather
//! than delivering records twice.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::model::Record;
use super::{split_records, FetchOutcome, RecordSource, SourceError};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

fn transport(err: reqwest::Error) -> SourceError {
    SourceError::Transport(Box::new(err))
}

/// HTTP source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Records per page; `None` fetches the listing in one request.
    pub page_size: Option<usize>,
    /// Upper bound on pages fetched per kind.
    pub max_pages: Option<usize>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            page_size: None,
            max_pages: None,
        }
    }
}

impl SourceConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.max_pages = Some(pages);
        self
    }

    fn validate(&self) -> Result<(), SourceError> {
        if self.base_url.trim().is_empty() {
            return Err(SourceError::Config("base_url must not be empty".into()));
        }
        if self.page_size == Some(0) {
            return Err(SourceError::Config("page_size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Record source that lists records over HTTP.
pub struct HttpSource {
    client: Client,
    base_url: String,
    config: SourceConfig,
}

impl HttpSource {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(transport)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// URL of one listing request.
    pub fn page_url(&self, kind: &str, page: Option<usize>) -> String {
        match (page, self.config.page_size) {
            (Some(page), Some(limit)) => format!("{}/{kind}?_page={page}&_limit={limit}", self.base_url),
            _ => format!("{}/{kind}", self.base_url),
        }
    }

    async fn fetch_page(&self, kind: &str, page: Option<usize>) -> Result<Vec<Record>, SourceError> {
        let url = self.page_url(kind, page);
        debug!(%url, "fetching records");

        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { status: status.as_u16(), url });
        }

        let body = response.text().await.map_err(transport)?;
        let payload: Value = serde_json::from_str(&body)?;
        split_records(kind, payload)
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch_and_iterate(
        &self,
        kind: &str,
        on_record: &mut (dyn FnMut(Record) + Send),
    ) -> FetchOutcome {
        let mut delivered = 0;
        let mut pages = 0;

        let Some(page_size) = self.config.page_size else {
            match self.fetch_page(kind, None).await {
                Ok(records) => {
                    pages = 1;
                    for record in records {
                        on_record(record);
                        delivered += 1;
                    }
                }
                Err(err) => return FetchOutcome::failed(kind, delivered, pages, &err),
            }
            info!(kind, delivered, pages, "fetch complete");
            return FetchOutcome::Complete { delivered, pages };
        };

        let mut previous_first: Option<Value> = None;
        loop {
            if self.config.max_pages.is_some_and(|max| pages >= max) {
                debug!(kind, pages, "page limit reached");
                break;
            }

            let records = match self.fetch_page(kind, Some(pages + 1)).await {
                Ok(records) => records,
                Err(err) => return FetchOutcome::failed(kind, delivered, pages, &err),
            };
            pages += 1;

            let received = records.len();
            if received > page_size {
                let err = SourceError::Paging(format!(
                    "page {pages} held {received} records, limit is {page_size}"
                ));
                return FetchOutcome::failed(kind, delivered, pages, &err);
            }
            let first = records.first().and_then(|r| r.get("id")).cloned();
            if first.is_some() && first == previous_first {
                let err = SourceError::Paging(format!("page {pages} repeats page {}", pages - 1));
                return FetchOutcome::failed(kind, delivered, pages, &err);
            }
            previous_first = first;

            for record in records {
                on_record(record);
                delivered += 1;
            }
            if received < page_size {
                break;
            }
        }

        info!(kind, delivered, pages, "fetch complete");
        FetchOutcome::Complete { delivered, pages }
    }
}
