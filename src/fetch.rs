//! The outbound fetch seam
//!
//! A pager never talks to the network itself; it hands a [`PageQuery`]
//! to whatever implements [`PageFetcher`] and waits for the decoded
//! response. The ready-made REST implementation lives in [`crate::http`];
//! tests and non-HTTP sources implement the trait directly.

use crate::error::Result;
use crate::page::PageResponse;
use async_trait::async_trait;
use std::collections::HashMap;

/// Request descriptor for a single page fetch
///
/// Carries the query parameters produced by the cursor plus the requested
/// page size. The fetcher decides how the page size is spelled on the
/// wire (`per`, `maxResults`, ...).
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    /// Query parameters, cursor position included
    pub params: HashMap<String, String>,
    /// Requested page size
    pub per_page: usize,
}

impl PageQuery {
    /// Create a query for the given page size
    pub fn new(per_page: usize) -> Self {
        Self {
            params: HashMap::new(),
            per_page,
        }
    }

    /// Add a query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set a query parameter in place
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Look up a query parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Asynchronous source of pages
///
/// One fetch per call; the pager guarantees it never issues a second
/// fetch while one is in flight on the same engine.
#[async_trait]
pub trait PageFetcher: Send + Sync + 'static {
    /// Decoded response type
    type Response: PageResponse + Send + 'static;

    /// Fetch one page described by `query`
    async fn fetch(&self, query: PageQuery) -> Result<Self::Response>;
}
