//! Integration tests using a mock HTTP server
//!
//! Exercises the full flow: pager → fetcher → HTTP → decoded page →
//! events → accumulated feed.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tunepage::{
    Feed, HttpClient, HttpClientConfig, HttpFetcher, OffsetPager, OffsetResponse, Page, PageEvent,
    TokenPager, TokenResponse,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Group {
    id: u64,
    name: String,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn group(id: u64) -> serde_json::Value {
    json!({ "id": id, "name": format!("group-{id}") })
}

fn groups(range: std::ops::RangeInclusive<u64>) -> Vec<serde_json::Value> {
    range.map(group).collect()
}

fn client_for(server: &MockServer) -> Arc<HttpClient> {
    Arc::new(HttpClient::with_config(
        HttpClientConfig::builder()
            .base_url(server.uri())
            .max_retries(0)
            .build(),
    ))
}

async fn recv_event(
    events: &mut tunepage::Events<Group>,
) -> PageEvent<Group> {
    timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("engine dropped")
}

// ============================================================================
// Offset pagination end to end
// ============================================================================

#[tokio::test]
async fn test_offset_pagination_end_to_end() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/groups"))
        .and(query_param("offset", "1"))
        .and(query_param("per", "20"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": groups(1..=20) })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/groups"))
        .and(query_param("offset", "21"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": groups(21..=25) })),
        )
        .mount(&server)
        .await;

    let fetcher: HttpFetcher<OffsetResponse<Group>> =
        HttpFetcher::new(client_for(&server), "/v1/groups");
    let pager = OffsetPager::new(fetcher, 20);
    let mut events = pager.subscribe();

    pager.refresh();
    let event = recv_event(&mut events).await;
    assert!(event.is_initial());
    assert_eq!(event.page().map(Page::len), Some(20));
    assert!(!pager.is_finished());

    pager.next();
    let event = recv_event(&mut events).await;
    assert!(event.is_next());
    assert_eq!(event.page().map(Page::len), Some(5));
    assert!(pager.is_finished());

    // Exhausted: no further requests hit the server.
    pager.next();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_feed_accumulates_over_http() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/lives"))
        .and(query_param("offset", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": groups(1..=20) })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/lives"))
        .and(query_param("offset", "21"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": groups(21..=30) })),
        )
        .mount(&server)
        .await;

    let fetcher: HttpFetcher<OffsetResponse<Group>> =
        HttpFetcher::new(client_for(&server), "/v1/lives");
    let feed = Feed::new(OffsetPager::new(fetcher, 20));
    let mut items = feed.items();

    feed.refresh();
    timeout(Duration::from_secs(5), items.changed())
        .await
        .expect("timed out")
        .unwrap();
    assert_eq!(items.borrow().len(), 20);

    // Scrolling near the end pulls the next page in.
    feed.will_display(18);
    timeout(Duration::from_secs(5), items.changed())
        .await
        .expect("timed out")
        .unwrap();

    let accumulated = items.borrow().clone();
    assert_eq!(accumulated.len(), 30);
    assert_eq!(accumulated[0].id, 1);
    assert_eq!(accumulated[29].id, 30);
}

// ============================================================================
// Token pagination end to end
// ============================================================================

#[tokio::test]
async fn test_token_pagination_end_to_end() {
    init_tracing();
    let server = MockServer::start().await;

    // First request carries no token at all.
    Mock::given(method("GET"))
        .and(path("/v1/videos"))
        .and(query_param("maxResults", "2"))
        .and(query_param("pageToken", "tok1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": groups(3..=4),
            "nextPageToken": "tok2"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/videos"))
        .and(query_param("pageToken", "tok2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": groups(5..=5)
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": groups(1..=2),
            "nextPageToken": "tok1"
        })))
        .mount(&server)
        .await;

    let fetcher: HttpFetcher<TokenResponse<Group>> =
        HttpFetcher::new(client_for(&server), "/v1/videos").per_param("maxResults");
    let pager = TokenPager::new(fetcher, 2);
    let mut events = pager.subscribe();

    pager.refresh();
    let event = recv_event(&mut events).await;
    assert!(event.is_initial());
    assert_eq!(event.page().unwrap().items()[0].id, 1);

    pager.next();
    let event = recv_event(&mut events).await;
    assert!(event.is_next());
    assert_eq!(event.page().unwrap().items()[0].id, 3);

    pager.next();
    let event = recv_event(&mut events).await;
    assert!(event.is_next());
    assert_eq!(event.page().unwrap().items()[0].id, 5);
    assert!(pager.is_finished());
}

// ============================================================================
// Error propagation end to end
// ============================================================================

#[tokio::test]
async fn test_error_event_and_manual_retry() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/feed"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/feed"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": groups(1..=5) })),
        )
        .mount(&server)
        .await;

    let fetcher: HttpFetcher<OffsetResponse<Group>> =
        HttpFetcher::new(client_for(&server), "/v1/feed");
    let feed = Feed::new(OffsetPager::new(fetcher, 20));
    let mut items = feed.items();
    let mut errors = feed.errors();

    feed.refresh();
    let err = timeout(Duration::from_secs(5), errors.recv())
        .await
        .expect("timed out")
        .expect("feed dropped");
    assert!(matches!(
        *err,
        tunepage::Error::HttpStatus { status: 500, .. }
    ));
    // The failure leaves the accumulated list untouched.
    assert!(feed.current_items().is_empty());

    // User-triggered retry from the same position succeeds.
    feed.next();
    timeout(Duration::from_secs(5), items.changed())
        .await
        .expect("timed out")
        .unwrap();
    assert_eq!(feed.current_items().len(), 5);
}

#[tokio::test]
async fn test_refresh_after_exhaustion_over_http() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("q", "jazz"))
        .and(query_param("offset", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": groups(1..=3) })),
        )
        .mount(&server)
        .await;

    let fetcher: HttpFetcher<OffsetResponse<Group>> =
        HttpFetcher::new(client_for(&server), "/v1/search").query("q", "jazz");
    let pager = OffsetPager::new(fetcher, 20);
    let mut events = pager.subscribe();

    pager.refresh();
    assert!(recv_event(&mut events).await.is_initial());
    assert!(pager.is_finished());

    // Pull-to-refresh restarts from offset 1 and reclassifies.
    pager.refresh();
    let event = recv_event(&mut events).await;
    assert!(event.is_initial());
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}
