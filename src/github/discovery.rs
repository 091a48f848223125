//! Cursor-paginated repository search

use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::query::{SearchData, DEFAULT_QUERY};
use super::retry::RetryPolicy;
use super::transport::{GraphqlTransport, TransportError};
use crate::models::RepositoryRecord;
use crate::tables::{self, TableError};

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Search page {page} failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        page: usize,
        attempts: u32,
        #[source]
        source: TransportError,
    },

    #[error("Malformed search response on page {page}: {message}")]
    MalformedResponse { page: usize, message: String },

    #[error("Failed to read query document {}: {source}", path.display())]
    QueryFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Output(#[from] TableError),
}

/// What to search for and how much of it
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    /// GitHub search string (`$searchQuery`)
    pub search: String,
    /// Results per page (`$pageSize`)
    pub page_size: u32,
    /// Hard cap on returned records
    pub max_repos: usize,
}

/// Repository search client. Holds the transport, the query document and the
/// retry policy for the lifetime of one run.
pub struct Discovery<T: GraphqlTransport> {
    transport: T,
    query: String,
    retry: RetryPolicy,
}

impl<T: GraphqlTransport> Discovery<T> {
    pub fn new(transport: T, query: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            query: query.into(),
            retry,
        }
    }

    /// Client using the built-in search document
    pub fn with_default_query(transport: T, retry: RetryPolicy) -> Self {
        Self::new(transport, DEFAULT_QUERY, retry)
    }

    /// Collect up to `max_repos` records in API order.
    ///
    /// `on_page` is called with the running total after every page.
    /// A page that still fails after the retry ceiling aborts the whole search.
    pub fn collect(
        &self,
        request: &DiscoveryRequest,
        mut on_page: impl FnMut(usize),
    ) -> Result<Vec<RepositoryRecord>, DiscoveryError> {
        let mut records: Vec<RepositoryRecord> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut has_next = true;
        let mut page = 0;

        while has_next && records.len() < request.max_repos {
            page += 1;
            let data = self.fetch_page(request, cursor.as_deref(), page)?;

            let page_info = data.search.page_info.unwrap_or_default();
            records.extend(data.search.edges.into_iter().map(|e| RepositoryRecord::from(e.node)));

            has_next = page_info.has_next_page;
            cursor = page_info.end_cursor;
            if has_next && cursor.is_none() {
                warn!("Page {} reports more results but no cursor; stopping", page);
                has_next = false;
            }

            info!("Collected {} repositories...", records.len());
            on_page(records.len().min(request.max_repos));
        }

        records.truncate(request.max_repos);
        debug!("Discovery finished after {} page(s)", page);
        Ok(records)
    }

    fn fetch_page(
        &self,
        request: &DiscoveryRequest,
        cursor: Option<&str>,
        page: usize,
    ) -> Result<SearchData, DiscoveryError> {
        let variables = json!({
            "searchQuery": request.search,
            "pageSize": request.page_size,
            "cursor": cursor,
        });

        let label = format!("Search page {}", page);
        let data = self
            .retry
            .run(&label, || self.transport.execute(&self.query, &variables))
            .map_err(|e| DiscoveryError::RetriesExhausted {
                page,
                attempts: e.attempts,
                source: e.last_error,
            })?;

        serde_json::from_value(data).map_err(|e| DiscoveryError::MalformedResponse {
            page,
            message: e.to_string(),
        })
    }
}

/// Read a GraphQL document from disk
pub fn load_query(path: &Path) -> Result<String, DiscoveryError> {
    std::fs::read_to_string(path).map_err(|source| DiscoveryError::QueryFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Collect, then write the table once. Nothing is written if collection fails.
pub fn discover_to_csv<T: GraphqlTransport>(
    discovery: &Discovery<T>,
    request: &DiscoveryRequest,
    output: &Path,
    on_page: impl FnMut(usize),
) -> Result<Vec<RepositoryRecord>, DiscoveryError> {
    let records = discovery.collect(request, on_page)?;
    tables::write_rows(output, &records)?;
    info!("Saved {} with {} records", output.display(), records.len());
    Ok(records)
}
