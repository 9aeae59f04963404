//! REST-backed page fetcher

use super::client::HttpClient;
use crate::error::Result;
use crate::fetch::{PageFetcher, PageQuery};
use crate::page::PageResponse;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

/// Default query parameter carrying the page size
const DEFAULT_PER_PARAM: &str = "per";

/// Page fetcher bound to a single REST list endpoint
///
/// Combines a shared [`HttpClient`], an endpoint path, and static query
/// parameters (search term, filters) with the cursor parameters the
/// pager produces per fetch. The response is decoded into any
/// [`PageResponse`] type.
///
/// ```rust,ignore
/// let client = Arc::new(HttpClient::with_config(config));
/// let fetcher: HttpFetcher<OffsetResponse<Group>> =
///     HttpFetcher::new(Arc::clone(&client), "/v1/groups").query("genre", "jazz");
/// let pager = OffsetPager::new(fetcher, 20);
/// ```
pub struct HttpFetcher<R> {
    client: Arc<HttpClient>,
    path: String,
    base_query: HashMap<String, String>,
    per_param: String,
    _response: PhantomData<fn() -> R>,
}

impl<R> HttpFetcher<R> {
    /// Create a fetcher for the given endpoint path
    pub fn new(client: Arc<HttpClient>, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
            base_query: HashMap::new(),
            per_param: DEFAULT_PER_PARAM.to_string(),
            _response: PhantomData,
        }
    }

    /// Add a static query parameter sent with every fetch
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_query.insert(key.into(), value.into());
        self
    }

    /// Override the page-size parameter name (`maxResults`, `limit`, ...)
    #[must_use]
    pub fn per_param(mut self, name: impl Into<String>) -> Self {
        self.per_param = name.into();
        self
    }

    /// The endpoint path this fetcher is bound to
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl<R> PageFetcher for HttpFetcher<R>
where
    R: PageResponse + DeserializeOwned + Send + 'static,
{
    type Response = R;

    async fn fetch(&self, query: PageQuery) -> Result<R> {
        let mut params = self.base_query.clone();
        // Cursor parameters win over static ones.
        params.extend(query.params);
        params.insert(self.per_param.clone(), query.per_page.to_string());
        self.client.get_json(&self.path, &params).await
    }
}

impl<R> std::fmt::Debug for HttpFetcher<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("path", &self.path)
            .field("base_query", &self.base_query)
            .finish_non_exhaustive()
    }
}
