//! # tunepage
//!
//! A reusable cursor-based pagination engine for REST list feeds.
//! One abstraction, instantiated generically once per listable resource:
//! feeds, event listings, profiles, comments, search results, tracks.
//!
//! ## Features
//!
//! - **One state machine everywhere**: fetch-in-flight tracking,
//!   end-of-list detection, and cursor advancement live in one place
//! - **Offset and token cursors**: the app's own REST convention and
//!   token-paged third-party APIs share the same engine
//! - **Event fan-out**: subscribers receive `Initial`/`Next`/`Error`
//!   events over disposable handles
//! - **Accumulating feeds**: a ready-made consumer that flattens page
//!   events into a displayable list with scroll-driven prefetch
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tunepage::{Feed, HttpClient, HttpClientConfig, HttpFetcher, OffsetPager, OffsetResponse};
//!
//! #[derive(Clone, serde::Deserialize)]
//! struct Group { id: u64, name: String }
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = Arc::new(HttpClient::with_config(
//!         HttpClientConfig::builder()
//!             .base_url("https://api.example.com")
//!             .build(),
//!     ));
//!     let fetcher: HttpFetcher<OffsetResponse<Group>> =
//!         HttpFetcher::new(client, "/v1/groups");
//!
//!     let feed = Feed::new(OffsetPager::new(fetcher, 20));
//!     let mut items = feed.items();
//!     feed.refresh();
//!
//!     while items.changed().await.is_ok() {
//!         println!("{} groups loaded", items.borrow().len());
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       Feed (consumer)                      │
//! │  items() → watch    errors() → stream    will_display(i)   │
//! └─────────────────────────────┬──────────────────────────────┘
//!                               │ PageEvent
//! ┌─────────────────────────────┴──────────────────────────────┐
//! │                      Pager (engine)                        │
//! │  refresh()   next()   subscribe()   {loading, finished}    │
//! └──────┬───────────────────────────────────────────┬─────────┘
//!        │ Cursor (offset / token)                   │ PageQuery
//! ┌──────┴─────────┐                       ┌─────────┴─────────┐
//! │  OffsetCursor  │                       │    PageFetcher    │
//! │  TokenCursor   │                       │  (HttpFetcher)    │
//! └────────────────┘                       └───────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Page containers, events, and the response trait
pub mod page;

/// Cursor state for paged requests
pub mod cursor;

/// The outbound fetch seam
pub mod fetch;

/// The pagination engine
pub mod pager;

/// Accumulating consumer over a pager
pub mod feed;

/// HTTP collaborator
pub mod http;

// ============================================================================
// Re-exports
// ============================================================================

pub use cursor::{Cursor, OffsetCursor, TokenCursor};
pub use error::{Error, Result};
pub use feed::{Feed, FeedErrors};
pub use fetch::{PageFetcher, PageQuery};
pub use http::{HttpClient, HttpClientConfig, HttpFetcher};
pub use page::{OffsetResponse, Page, PageEvent, PageResponse, TokenResponse};
pub use pager::{Events, ItemOf, OffsetPager, Pager, TokenPager};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
