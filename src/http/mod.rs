//! HTTP collaborator module
//!
//! The pagination engine's only outbound dependency: given a query
//! descriptor, perform one typed request/response exchange. [`HttpClient`]
//! owns transport concerns (base URL, headers, timeout, retry with
//! backoff); [`HttpFetcher`] binds a client to one list endpoint and
//! implements [`PageFetcher`](crate::fetch::PageFetcher).

mod client;
mod fetcher;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use fetcher::HttpFetcher;
