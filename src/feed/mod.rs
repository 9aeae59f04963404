//! Accumulating consumer over a pager
//!
//! # Overview
//!
//! Every list screen follows the same shape: own one engine, merge its
//! pages into a displayable list, surface errors without touching the
//! list, and ask for more as the user scrolls. [`Feed`] is that shape,
//! packaged. It subscribes to its pager and maintains the accumulated
//! item list behind a watch channel; `Initial` replaces the list, `Next`
//! appends, `Error` is re-broadcast as-is.

use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::cursor::{Cursor, OffsetCursor};
use crate::error::Error;
use crate::fetch::PageFetcher;
use crate::page::PageEvent;
use crate::pager::{Events, ItemOf, Pager};

/// How close to the end of the list a displayed item may get before the
/// next page is requested
const DEFAULT_PREFETCH_MARGIN: usize = 4;

/// Errors buffered per subscriber
const ERROR_CAPACITY: usize = 16;

/// A consumer that flattens a pager's events into an accumulated list
///
/// The accumulated list only ever grows within a refresh cycle; errors
/// never clear previously fetched items.
pub struct Feed<F, C = OffsetCursor>
where
    F: PageFetcher,
    C: Cursor,
{
    pager: Pager<F, C>,
    items: Arc<watch::Sender<Vec<ItemOf<F>>>>,
    errors: broadcast::Sender<Arc<Error>>,
    prefetch_margin: usize,
    listener: JoinHandle<()>,
}

impl<F, C> Feed<F, C>
where
    F: PageFetcher,
    ItemOf<F>: Clone + Send + Sync + 'static,
    C: Cursor,
{
    /// Create a feed over the given engine
    ///
    /// Spawns a listener task; must be called from within a Tokio
    /// runtime.
    pub fn new(pager: Pager<F, C>) -> Self {
        let (items, _) = watch::channel(Vec::new());
        let items = Arc::new(items);
        let (errors, _) = broadcast::channel(ERROR_CAPACITY);
        let listener = Self::spawn_listener(pager.subscribe(), &items, &errors);
        Self {
            pager,
            items,
            errors,
            prefetch_margin: DEFAULT_PREFETCH_MARGIN,
            listener,
        }
    }

    /// Override the prefetch margin
    #[must_use]
    pub fn with_prefetch_margin(mut self, margin: usize) -> Self {
        self.prefetch_margin = margin;
        self
    }

    fn spawn_listener(
        mut events: Events<ItemOf<F>>,
        items: &Arc<watch::Sender<Vec<ItemOf<F>>>>,
        errors: &broadcast::Sender<Arc<Error>>,
    ) -> JoinHandle<()> {
        let items = Arc::clone(items);
        let errors = errors.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    PageEvent::Initial(page) => {
                        items.send_replace(page.into_items());
                    }
                    PageEvent::Next(page) => {
                        items.send_modify(|list| list.extend(page.into_items()));
                    }
                    PageEvent::Error(err) => {
                        // List stays intact; consumers surface the error
                        // and the user retries.
                        let _ = errors.send(err);
                    }
                }
            }
        })
    }

    /// Restart from the first page
    pub fn refresh(&self) {
        self.pager.refresh();
    }

    /// Request the next page
    pub fn next(&self) {
        self.pager.next();
    }

    /// Scroll-proximity hook
    ///
    /// Call with the index of the item about to be displayed; once it
    /// comes within the prefetch margin of the end of the accumulated
    /// list, the next page is requested. Safe to call eagerly: the
    /// engine's guards drop redundant requests.
    pub fn will_display(&self, index: usize) {
        let len = self.items.borrow().len();
        if index + self.prefetch_margin + 1 >= len {
            self.pager.next();
        }
    }

    /// Watch the accumulated item list
    pub fn items(&self) -> watch::Receiver<Vec<ItemOf<F>>> {
        self.items.subscribe()
    }

    /// Snapshot of the accumulated item list
    pub fn current_items(&self) -> Vec<ItemOf<F>> {
        self.items.borrow().clone()
    }

    /// Subscribe to fetch errors
    pub fn errors(&self) -> FeedErrors {
        FeedErrors {
            rx: self.errors.subscribe(),
        }
    }

    /// Watch whether an initial fetch is in flight
    pub fn is_refreshing(&self) -> watch::Receiver<bool> {
        self.pager.is_refreshing()
    }

    /// The engine this feed is bound to
    pub fn pager(&self) -> &Pager<F, C> {
        &self.pager
    }

    /// Swap in a freshly constructed engine
    ///
    /// Used when the underlying query (search term, filter) changes: the
    /// old engine and its in-flight fetch are discarded. Accumulated
    /// items stay visible until the new engine's first page replaces
    /// them; call [`refresh`](Self::refresh) to load it.
    pub fn rebind(&mut self, pager: Pager<F, C>) {
        self.listener.abort();
        self.listener = Self::spawn_listener(pager.subscribe(), &self.items, &self.errors);
        self.pager = pager;
    }
}

impl<F, C> Pager<F, C>
where
    F: PageFetcher,
    ItemOf<F>: Clone + Send + Sync + 'static,
    C: Cursor,
{
    /// Flatten this engine into an accumulating [`Feed`]
    ///
    /// For consumers that prefer the "all items so far" view over
    /// discrete page events.
    pub fn into_feed(self) -> Feed<F, C> {
        Feed::new(self)
    }
}

impl<F, C> Drop for Feed<F, C>
where
    F: PageFetcher,
    C: Cursor,
{
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl<F, C> std::fmt::Debug for Feed<F, C>
where
    F: PageFetcher,
    C: Cursor,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("len", &self.items.borrow().len())
            .field("prefetch_margin", &self.prefetch_margin)
            .finish_non_exhaustive()
    }
}

/// Subscription handle to a feed's error stream
pub struct FeedErrors {
    rx: broadcast::Receiver<Arc<Error>>,
}

impl FeedErrors {
    /// Wait for the next fetch error
    ///
    /// Returns `None` once the feed has been dropped.
    pub async fn recv(&mut self) -> Option<Arc<Error>> {
        loop {
            match self.rx.recv().await {
                Ok(err) => return Some(err),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(_)) => {}
            }
        }
    }
}
