//! Page types and the response trait

use crate::error::Error;
use serde::Deserialize;
use std::sync::Arc;

/// One fetched batch of items
///
/// Items keep server order; appending pages in event order reconstructs
/// the full list. A page is immutable once constructed.
#[derive(Debug, Clone)]
pub struct Page<T> {
    items: Vec<T>,
    has_more: bool,
}

impl<T> Page<T> {
    /// Create a new page
    pub fn new(items: Vec<T>, has_more: bool) -> Self {
        Self { items, has_more }
    }

    /// The items in this page, in server order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, taking ownership of its items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Number of items in this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if this page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether another page is assumed to follow this one
    pub fn has_more(&self) -> bool {
        self.has_more
    }
}

/// Outcome of a single fetch, fanned out to subscribers
///
/// Exactly one `Initial` is emitted per refresh cycle, followed by zero
/// or more `Next` events. `Error` can occur at any point and leaves the
/// pager's cursor untouched, so a later `next()` retries from the same
/// position.
#[derive(Debug, Clone)]
pub enum PageEvent<T> {
    /// First page of the current refresh cycle
    Initial(Page<T>),
    /// A continuation page
    Next(Page<T>),
    /// A failed fetch; shared because events fan out to many subscribers
    Error(Arc<Error>),
}

impl<T> PageEvent<T> {
    /// Check if this is an initial-page event
    pub fn is_initial(&self) -> bool {
        matches!(self, Self::Initial(_))
    }

    /// Check if this is a continuation-page event
    pub fn is_next(&self) -> bool {
        matches!(self, Self::Next(_))
    }

    /// Check if this is an error event
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The carried page, if this event is a successful fetch
    pub fn page(&self) -> Option<&Page<T>> {
        match self {
            Self::Initial(page) | Self::Next(page) => Some(page),
            Self::Error(_) => None,
        }
    }
}

/// Decoded wire shape of a paged list response
///
/// Any response type a fetcher produces implements this; the pager only
/// needs the item list and enough information to decide whether more
/// data remains.
pub trait PageResponse {
    /// The element type of the list
    type Item;

    /// The items in this response, in server order
    fn items(&self) -> &[Self::Item];

    /// Consume the response, taking ownership of its items
    fn into_items(self) -> Vec<Self::Item>;

    /// Whether another page should be assumed after this one
    ///
    /// The default rule is the count comparison used uniformly across
    /// list endpoints: a batch shorter than the requested page size
    /// terminates pagination.
    fn has_more(&self, per_page: usize) -> bool {
        self.items().len() >= per_page
    }

    /// Continuation token, for token-paged APIs
    fn next_token(&self) -> Option<&str> {
        None
    }
}

/// A bare JSON array is the simplest paged response
impl<T> PageResponse for Vec<T> {
    type Item = T;

    fn items(&self) -> &[T] {
        self
    }

    fn into_items(self) -> Vec<T> {
        self
    }
}

/// Offset-paged response body: items under an `items` field
#[derive(Debug, Clone, Deserialize)]
pub struct OffsetResponse<T> {
    /// The fetched items
    pub items: Vec<T>,
}

impl<T> PageResponse for OffsetResponse<T> {
    type Item = T;

    fn items(&self) -> &[T] {
        &self.items
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Token-paged response body, the YouTube-Data / Apple-Music convention
///
/// Continuation stops on a short batch like everywhere else, and also
/// when the server omits the token from a full batch: a token-paged API
/// that sends no token has nothing left to serve.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse<T> {
    /// The fetched items
    pub items: Vec<T>,
    /// Token identifying the next batch, absent on the last page
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl<T> PageResponse for TokenResponse<T> {
    type Item = T;

    fn items(&self) -> &[T] {
        &self.items
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }

    fn has_more(&self, per_page: usize) -> bool {
        self.items.len() >= per_page && self.next_page_token.is_some()
    }

    fn next_token(&self) -> Option<&str> {
        self.next_page_token.as_deref()
    }
}
