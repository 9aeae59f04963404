//! Page containers and events
//!
//! # Overview
//!
//! The page module defines the data that flows out of a pager: `Page` is
//! one fetched batch of items, `PageEvent` is the outcome of a single
//! fetch as seen by subscribers. `PageResponse` is the duck-typed wire
//! shape a fetcher decodes into; two generic response bodies covering the
//! common offset-paged and token-paged conventions ship here.

mod types;

pub use types::{OffsetResponse, Page, PageEvent, PageResponse, TokenResponse};
