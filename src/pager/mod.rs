//! Pagination engine
//!
//! # Overview
//!
//! [`Pager`] is the stateful driver behind every list screen: it owns the
//! cursor, tracks whether a fetch is in flight and whether the end of the
//! list has been reached, and fans out [`PageEvent`]s to subscribers.
//!
//! The state machine is small:
//!
//! ```text
//! Idle-fresh ──next()──▶ Loading ──success (full page)──▶ Idle-continuing
//!     ▲                    │  │
//!     │                    │  └──success (short page)──▶ Finished
//!  refresh()               └──failure──▶ previous idle state
//! ```
//!
//! `next()` is a no-op while loading or finished; `refresh()` cancels any
//! in-flight fetch, resets the cursor, and always issues exactly one
//! fetch whose result is classified `Initial`.

use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cursor::{Cursor, OffsetCursor, TokenCursor};
use crate::error::Result;
use crate::fetch::{PageFetcher, PageQuery};
use crate::page::{Page, PageEvent, PageResponse};

/// Item type produced by a fetcher
pub type ItemOf<F> = <<F as PageFetcher>::Response as PageResponse>::Item;

/// Events buffered per subscriber before the slowest one starts lagging
const EVENT_CAPACITY: usize = 32;

/// The stateful pagination driver
///
/// Cheap to clone; clones share the same engine. An engine instance is
/// meant to be owned by a single consumer and discarded (not reused) when
/// the underlying query changes.
///
/// All operations must be called from within a Tokio runtime: fetches run
/// as spawned tasks and complete asynchronously.
pub struct Pager<F: PageFetcher, C: Cursor = OffsetCursor> {
    inner: Arc<Inner<F, C>>,
}

/// Offset-paged engine, the app's own REST endpoints
pub type OffsetPager<F> = Pager<F, OffsetCursor>;

/// Token-paged engine, YouTube-Data / Apple-Music style endpoints
pub type TokenPager<F> = Pager<F, TokenCursor>;

struct Inner<F: PageFetcher, C> {
    fetcher: Arc<F>,
    per_page: usize,
    state: Mutex<FetchState<C>>,
    events: broadcast::Sender<PageEvent<ItemOf<F>>>,
    refreshing: watch::Sender<bool>,
    inflight: Mutex<Option<JoinHandle<()>>>,
}

struct FetchState<C> {
    cursor: C,
    is_initial: bool,
    is_loading: bool,
    is_finished: bool,
    /// Bumped on refresh; completions carrying an older epoch are stale
    /// and discarded without touching state.
    epoch: u64,
}

impl<F, C> Pager<F, C>
where
    F: PageFetcher,
    ItemOf<F>: Clone + Send + 'static,
    C: Cursor,
{
    /// Create an engine with the cursor's default starting position
    pub fn new(fetcher: F, per_page: usize) -> Self
    where
        C: Default,
    {
        Self::with_cursor(fetcher, per_page, C::default())
    }

    /// Create an engine with an explicitly configured cursor
    pub fn with_cursor(fetcher: F, per_page: usize, cursor: C) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (refreshing, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                fetcher: Arc::new(fetcher),
                per_page,
                state: Mutex::new(FetchState {
                    cursor,
                    is_initial: true,
                    is_loading: false,
                    is_finished: false,
                    epoch: 0,
                }),
                events,
                refreshing,
                inflight: Mutex::new(None),
            }),
        }
    }

    /// Page size requested on every fetch
    pub fn per_page(&self) -> usize {
        self.inner.per_page
    }

    /// Whether a fetch is currently in flight
    pub fn is_loading(&self) -> bool {
        self.inner.state().is_loading
    }

    /// Whether the end of the list has been reached
    ///
    /// Once true, `next()` is a no-op until `refresh()`.
    pub fn is_finished(&self) -> bool {
        self.inner.state().is_finished
    }

    /// Watch whether an initial-classified fetch is in flight
    ///
    /// Drives pull-to-refresh spinners.
    pub fn is_refreshing(&self) -> watch::Receiver<bool> {
        self.inner.refreshing.subscribe()
    }

    /// Subscribe to this engine's events
    ///
    /// Every live subscriber sees every event emitted while its handle is
    /// held; there is no replay, so a late subscriber misses events
    /// emitted before it subscribed. Drop the handle to unsubscribe.
    pub fn subscribe(&self) -> Events<ItemOf<F>> {
        Events {
            rx: self.inner.events.subscribe(),
        }
    }

    /// Restart pagination from the first page
    ///
    /// Cancels any in-flight fetch (its result is never emitted), resets
    /// the cursor and end-of-list state, and issues exactly one fetch
    /// classified `Initial`.
    pub fn refresh(&self) {
        if let Ok(mut guard) = self.inner.inflight.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
        {
            let mut state = self.inner.state();
            state.epoch += 1;
            state.cursor.reset();
            state.is_initial = true;
            state.is_loading = false;
            state.is_finished = false;
        }
        debug!("refresh: cursor reset, issuing initial fetch");
        self.next();
    }

    /// Fetch the next page
    ///
    /// No-op while a fetch is in flight or after the end of the list was
    /// reached; the call is dropped silently, not queued. Otherwise one
    /// asynchronous fetch is issued with the current cursor position and
    /// the result arrives via subscribed [`Events`] handles.
    pub fn next(&self) {
        let (query, was_initial, epoch) = {
            let mut state = self.inner.state();
            if state.is_loading || state.is_finished {
                debug!(
                    loading = state.is_loading,
                    finished = state.is_finished,
                    "next: dropped"
                );
                return;
            }
            state.is_loading = true;
            let was_initial = state.is_initial;
            state.is_initial = false;
            let mut query = PageQuery::new(self.inner.per_page);
            state.cursor.apply(&mut query);
            (query, was_initial, state.epoch)
        };

        if was_initial {
            self.inner.refreshing.send_replace(true);
        }
        debug!(initial = was_initial, "dispatching page fetch");

        let fetcher = Arc::clone(&self.inner.fetcher);
        // The task holds the engine weakly so tearing down the last Pager
        // handle drops (and aborts) the in-flight fetch instead of letting
        // a stale completion fire.
        let inner = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            let result = fetcher.fetch(query).await;
            if let Some(inner) = inner.upgrade() {
                inner.complete(result, was_initial, epoch);
            }
        });
        if let Ok(mut guard) = self.inner.inflight.lock() {
            *guard = Some(handle);
        }
    }
}

impl<F, C> Inner<F, C>
where
    F: PageFetcher,
    ItemOf<F>: Clone + Send + 'static,
    C: Cursor,
{
    /// Apply a fetch outcome to the state machine and emit the event
    fn complete(&self, result: Result<F::Response>, was_initial: bool, epoch: u64) {
        let event = {
            let mut state = self.state();
            if state.epoch != epoch {
                debug!("discarding stale fetch completion");
                return;
            }
            state.is_loading = false;
            match result {
                Ok(response) => {
                    let has_more = response.has_more(self.per_page);
                    if has_more {
                        state.cursor.advance(&response, self.per_page);
                    } else {
                        state.is_finished = true;
                    }
                    debug!(
                        count = response.items().len(),
                        finished = state.is_finished,
                        "page fetch succeeded"
                    );
                    let page = Page::new(response.into_items(), has_more);
                    if was_initial {
                        PageEvent::Initial(page)
                    } else {
                        PageEvent::Next(page)
                    }
                }
                Err(err) => {
                    warn!(error = %err, "page fetch failed");
                    PageEvent::Error(Arc::new(err))
                }
            }
        };

        if was_initial {
            self.refreshing.send_replace(false);
        }
        // No subscribers is fine; events are fire-and-forget.
        let _ = self.events.send(event);
    }
}

impl<F: PageFetcher, C> Inner<F, C> {
    fn state(&self) -> MutexGuard<'_, FetchState<C>> {
        self.state.lock().expect("pager state lock poisoned")
    }
}

impl<F: PageFetcher, C> Drop for Inner<F, C> {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.inflight.lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}

impl<F: PageFetcher, C: Cursor> Clone for Pager<F, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: PageFetcher, C: Cursor> std::fmt::Debug for Pager<F, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state();
        f.debug_struct("Pager")
            .field("per_page", &self.inner.per_page)
            .field("is_initial", &state.is_initial)
            .field("is_loading", &state.is_loading)
            .field("is_finished", &state.is_finished)
            .finish_non_exhaustive()
    }
}

/// Subscription handle to a pager's event feed
///
/// Dropping the handle unsubscribes; other subscribers are unaffected.
pub struct Events<T> {
    rx: broadcast::Receiver<PageEvent<T>>,
}

impl<T: Clone> Events<T> {
    /// Wait for the next event
    ///
    /// Returns `None` once the engine has been dropped.
    pub async fn recv(&mut self) -> Option<PageEvent<T>> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event subscriber lagged, resuming");
                }
            }
        }
    }
}
