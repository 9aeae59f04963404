//! Cursor state for paged requests
//!
//! # Overview
//!
//! A cursor is the opaque continuation state advanced after every
//! successful fetch: an item offset for the app's own REST endpoints, a
//! page token for third-party APIs. Cursors know how to write their
//! position into an outgoing [`PageQuery`], how to advance past a fetched
//! response, and how to return to the first page on refresh. The pager is
//! generic over this trait; the two implementations here cover every list
//! endpoint the client talks to.

use crate::fetch::PageQuery;
use crate::page::PageResponse;

/// Default query parameter carrying the offset position
pub const DEFAULT_OFFSET_PARAM: &str = "offset";

/// Default query parameter carrying the continuation token
pub const DEFAULT_TOKEN_PARAM: &str = "pageToken";

/// Continuation state advanced after every successful fetch
pub trait Cursor: Clone + Send + 'static {
    /// Write this cursor's position into the outgoing query
    fn apply(&self, query: &mut PageQuery);

    /// Advance past a successfully fetched page
    fn advance<R: PageResponse>(&mut self, response: &R, per_page: usize);

    /// Return to the first page
    fn reset(&mut self);
}

/// 1-based item offset cursor (`?offset=21&per=20` style)
///
/// Starts at 1 and advances by the page size after every full batch.
#[derive(Debug, Clone)]
pub struct OffsetCursor {
    offset: u64,
    start: u64,
    param: String,
}

impl OffsetCursor {
    /// Create a cursor starting at offset 1
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Create a cursor with a custom first offset
    pub fn starting_at(start: u64) -> Self {
        Self {
            offset: start,
            start,
            param: DEFAULT_OFFSET_PARAM.to_string(),
        }
    }

    /// Override the query parameter name
    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    /// Current offset position
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl Default for OffsetCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor for OffsetCursor {
    fn apply(&self, query: &mut PageQuery) {
        query.set_param(&self.param, self.offset.to_string());
    }

    fn advance<R: PageResponse>(&mut self, _response: &R, per_page: usize) {
        self.offset += per_page as u64;
    }

    fn reset(&mut self) {
        self.offset = self.start;
    }
}

/// Continuation token cursor (`?pageToken=abc` style)
///
/// Starts empty; the first request carries no token parameter at all.
#[derive(Debug, Clone)]
pub struct TokenCursor {
    token: Option<String>,
    param: String,
}

impl TokenCursor {
    /// Create an empty token cursor
    pub fn new() -> Self {
        Self {
            token: None,
            param: DEFAULT_TOKEN_PARAM.to_string(),
        }
    }

    /// Override the query parameter name
    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = param.into();
        self
    }

    /// Current continuation token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl Default for TokenCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor for TokenCursor {
    fn apply(&self, query: &mut PageQuery) {
        if let Some(token) = &self.token {
            query.set_param(&self.param, token.clone());
        }
    }

    fn advance<R: PageResponse>(&mut self, response: &R, _per_page: usize) {
        self.token = response.next_token().map(str::to_owned);
    }

    fn reset(&mut self) {
        self.token = None;
    }
}
