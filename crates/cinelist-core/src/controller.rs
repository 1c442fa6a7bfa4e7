//! Fetch/search controller for the movie list.
//!
//! `FetchController` owns a [`FetchState`] and drives it through initial
//! load, refresh, debounced search and pagination. Requests run as spawned
//! tasks; their completions are queued and applied on the owner's side by
//! [`FetchController::next_event`], so state is only ever mutated from one
//! place.
//!
//! Every request and every debounce timer carries a ticket. Issuing a new
//! request aborts the previous one and bumps the ticket, so a completion
//! that arrives late is recognized as stale and dropped without touching
//! the list.

use std::sync::Arc;
use std::time::Duration;

use cinelist_api::catalog::{CatalogApi, ListItem};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::debounce::Debouncer;
use crate::error::FetchError;
use crate::state::{FetchState, FetchStatus, ListMode};

/// Quiet period between the last keystroke and the search request.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

/// Operation that issued a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// First browse page on mount.
    Initial,
    /// Page 1 of the active context, re-fetched.
    Refresh,
    /// Next page of the active context.
    LoadMore,
    /// Page 1 of a new search.
    Search,
    /// Page 1 of the browse listing after the query was cleared.
    ClearSearch,
}

impl RequestKind {
    /// Whether a successful response replaces the list instead of extending it.
    const fn replaces(self) -> bool {
        !matches!(self, Self::LoadMore)
    }
}

/// Outcome of applying one queued completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// The debounce period elapsed and the search request went out.
    SearchStarted {
        /// Query being searched.
        query: String,
    },
    /// A page was applied to the list.
    PageLoaded {
        /// Operation that requested the page.
        kind: RequestKind,
        /// Page number.
        page: u32,
        /// Number of items in the page.
        count: usize,
    },
    /// A request failed; the list is unchanged.
    Failed {
        /// Operation that requested the page.
        kind: RequestKind,
        /// Failure reason.
        error: FetchError,
    },
    /// A superseded completion was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PageTarget {
    Browse { page: u32 },
    Search { query: String, page: u32 },
}

impl PageTarget {
    fn for_context(mode: ListMode, query: &str, page: u32) -> Self {
        match mode {
            ListMode::Browsing => Self::Browse { page },
            ListMode::Searching => Self::Search {
                query: String::from(query),
                page,
            },
        }
    }

    const fn page(&self) -> u32 {
        match self {
            Self::Browse { page } | Self::Search { page, .. } => *page,
        }
    }
}

#[derive(Debug)]
enum Message {
    DebounceElapsed {
        ticket: u64,
        query: String,
    },
    PageFetched {
        ticket: u64,
        result: Result<Vec<ListItem>, FetchError>,
    },
}

#[derive(Debug)]
struct InFlight {
    ticket: u64,
    kind: RequestKind,
    page: u32,
    handle: JoinHandle<()>,
}

/// Coordinates list loading for one list screen.
///
/// Create it when the screen mounts and call [`teardown`](Self::teardown)
/// (or drop it) when the screen goes away. Operations are synchronous and
/// never block; results arrive through [`next_event`](Self::next_event).
#[derive(Debug)]
pub struct FetchController<C> {
    client: Arc<C>,
    state: FetchState,
    debouncer: Debouncer,
    in_flight: Option<InFlight>,
    next_ticket: u64,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
    live: bool,
}

impl<C> FetchController<C> {
    /// Creates a controller with the default debounce delay.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self::with_debounce(client, DEFAULT_DEBOUNCE)
    }

    /// Creates a controller with a custom debounce delay.
    #[must_use]
    pub fn with_debounce(client: Arc<C>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            state: FetchState::default(),
            debouncer: Debouncer::new(delay),
            in_flight: None,
            next_ticket: 0,
            tx,
            rx,
            live: true,
        }
    }

    /// Current list state.
    #[must_use]
    pub const fn state(&self) -> &FetchState {
        &self.state
    }

    /// Returns `false` once the controller has been torn down.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        self.live
    }

    /// Dismisses an `Error` status. Any other status is left alone.
    ///
    /// Settles on `SearchDebouncing` if a search is still scheduled,
    /// otherwise on `Idle`.
    pub fn clear_error(&mut self) {
        if self.live && matches!(self.state.status, FetchStatus::Error(_)) {
            self.state.status = self.settled_status();
        }
    }

    /// Cancels the pending debounce timer and the in-flight request.
    ///
    /// Afterwards every operation is a no-op and `next_event` returns
    /// `None`; completions that were already queued are discarded.
    pub fn teardown(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        self.debouncer.cancel();
        self.cancel_in_flight();
        self.rx.close();
        debug!("fetch controller torn down");
    }

    /// Waits for the next completion and applies it to the state.
    ///
    /// Returns `None` after teardown.
    pub async fn next_event(&mut self) -> Option<FetchEvent>
    where
        C: CatalogApi + Sync + 'static,
    {
        if !self.live {
            return None;
        }
        let message = self.rx.recv().await?;
        Some(self.apply(message))
    }

    /// Applies a completion if one is already queued, without waiting.
    pub fn try_next_event(&mut self) -> Option<FetchEvent>
    where
        C: CatalogApi + Sync + 'static,
    {
        if !self.live {
            return None;
        }
        let message = self.rx.try_recv().ok()?;
        Some(self.apply(message))
    }

    fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
            debug!(ticket = in_flight.ticket, "aborted in-flight request");
        }
    }

    fn take_ticket(&mut self) -> u64 {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.next_ticket
    }

    /// Status to settle on once a request completes successfully.
    const fn settled_status(&self) -> FetchStatus {
        if self.debouncer.is_pending() {
            FetchStatus::SearchDebouncing
        } else {
            FetchStatus::Idle
        }
    }
}

impl<C> FetchController<C>
where
    C: CatalogApi + Sync + 'static,
{
    /// Loads page 1 of the browse listing.
    ///
    /// Does nothing while an initial load is already running.
    ///
    /// Requests run on the ambient tokio runtime; calling this outside
    /// a runtime panics.
    pub fn load_initial(&mut self) {
        if !self.live || matches!(self.state.status, FetchStatus::InitialLoading) {
            return;
        }
        self.debouncer.cancel();
        self.state.search_input.clear();
        self.state.enter_context(ListMode::Browsing, String::new());
        self.state.status = FetchStatus::InitialLoading;
        self.issue(RequestKind::Initial, PageTarget::Browse { page: 1 });
    }

    /// Re-fetches page 1 of the active context and replaces the list.
    ///
    /// Does nothing while a refresh is already running. Supersedes any
    /// other in-flight request; a pending search timer keeps running.
    pub fn refresh(&mut self) {
        if !self.live || matches!(self.state.status, FetchStatus::Refreshing) {
            return;
        }
        let target = PageTarget::for_context(self.state.mode, &self.state.active_query, 1);
        self.state.status = FetchStatus::Refreshing;
        self.issue(RequestKind::Refresh, target);
    }

    /// Records new search text.
    ///
    /// Non-empty text (after trimming) starts or restarts the debounce
    /// timer; the search itself goes out once the text has been stable
    /// for the debounce delay. Empty text cancels the timer and reloads
    /// the browse listing right away.
    pub fn search(&mut self, query: &str) {
        if !self.live {
            return;
        }
        self.state.search_input = String::from(query);
        self.debouncer.cancel();

        if query.trim().is_empty() {
            debug!("search cleared, reloading browse listing");
            self.state.enter_context(ListMode::Browsing, String::new());
            self.state.status = FetchStatus::LoadingQuery;
            self.issue(RequestKind::ClearSearch, PageTarget::Browse { page: 1 });
            return;
        }

        self.cancel_in_flight();
        self.state.status = FetchStatus::SearchDebouncing;
        let ticket = self.take_ticket();
        self.debouncer.schedule(
            ticket,
            self.tx.clone(),
            Message::DebounceElapsed {
                ticket,
                query: String::from(query),
            },
        );
    }

    /// Appends the next page of the active context.
    ///
    /// Does nothing while any load is running or a search is pending,
    /// after a page came back empty, or while the list still shows a
    /// previous context.
    pub fn load_more(&mut self) {
        if !self.live
            || self.state.status.is_busy()
            || self.debouncer.is_pending()
            || self.state.end_of_results
            || self.state.needs_reload
        {
            return;
        }
        let next_page = self.state.current_page.saturating_add(1);
        let target =
            PageTarget::for_context(self.state.mode, &self.state.active_query, next_page);
        self.state.status = FetchStatus::LoadingMore;
        self.issue(RequestKind::LoadMore, target);
    }

    fn issue(&mut self, kind: RequestKind, target: PageTarget) {
        self.cancel_in_flight();
        let ticket = self.take_ticket();
        let page = target.page();
        debug!(ticket, ?kind, ?target, "issuing page request");

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let result = match &target {
                PageTarget::Browse { page } => client.fetch_page(*page).await,
                PageTarget::Search { query, page } => client.search_page(query, *page).await,
            };
            let result = result.map_err(|err| FetchError::from_report(&err));
            // Receiver is closed once the controller is torn down.
            let _ = tx.send(Message::PageFetched { ticket, result });
        });

        self.in_flight = Some(InFlight {
            ticket,
            kind,
            page,
            handle,
        });
    }

    fn apply(&mut self, message: Message) -> FetchEvent {
        match message {
            Message::DebounceElapsed { ticket, query } => self.start_search(ticket, query),
            Message::PageFetched { ticket, result } => self.apply_page(ticket, result),
        }
    }

    fn start_search(&mut self, ticket: u64, query: String) -> FetchEvent {
        if !self.debouncer.complete(ticket) {
            debug!(ticket, "dropping superseded debounce timer");
            return FetchEvent::Stale;
        }
        info!(query = %query, "searching");
        self.state.enter_context(ListMode::Searching, query.clone());
        self.state.status = FetchStatus::LoadingQuery;
        self.issue(
            RequestKind::Search,
            PageTarget::Search {
                query: query.clone(),
                page: 1,
            },
        );
        FetchEvent::SearchStarted { query }
    }

    fn apply_page(&mut self, ticket: u64, result: Result<Vec<ListItem>, FetchError>) -> FetchEvent {
        let Some(in_flight) = self.in_flight.take_if(|in_flight| in_flight.ticket == ticket) else {
            debug!(ticket, "dropping superseded page response");
            return FetchEvent::Stale;
        };
        let InFlight { kind, page, .. } = in_flight;

        match result {
            Ok(items) => {
                let count = items.len();
                if kind.replaces() {
                    self.state.items = items;
                    self.state.current_page = page;
                    self.state.end_of_results = count == 0;
                    self.state.needs_reload = false;
                } else if count == 0 {
                    self.state.end_of_results = true;
                } else {
                    self.state.items.extend(items);
                    self.state.current_page = page;
                }
                self.state.status = self.settled_status();
                info!(?kind, page, count, total = self.state.items.len(), "page loaded");
                FetchEvent::PageLoaded { kind, page, count }
            }
            Err(error) => {
                warn!(?kind, page, error = %error, "page request failed");
                self.state.status = FetchStatus::Error(error.clone());
                FetchEvent::Failed { kind, error }
            }
        }
    }
}

impl<C> Drop for FetchController<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use anyhow::{Result, anyhow, bail};
    use cinelist_api::catalog::MovieDetail;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Browse(u32),
        Search(String, u32),
    }

    /// Catalog that answers requests from a script, in call order.
    #[derive(Debug, Default)]
    struct ScriptedCatalog {
        calls: Mutex<Vec<Call>>,
        responses: Mutex<VecDeque<Result<Vec<ListItem>, String>>>,
    }

    impl ScriptedCatalog {
        fn with(responses: Vec<Result<Vec<ListItem>, String>>) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.into()),
            })
        }

        fn push(&self, response: Result<Vec<ListItem>, String>) {
            self.responses.lock().unwrap().push_back(response);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, call: Call) -> Result<Vec<ListItem>> {
            self.calls.lock().unwrap().push(call);
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(items)) => Ok(items),
                Some(Err(message)) => Err(anyhow!(message)),
                None => bail!("no scripted response"),
            }
        }
    }

    impl CatalogApi for ScriptedCatalog {
        async fn fetch_page(&self, page: u32) -> Result<Vec<ListItem>> {
            self.answer(Call::Browse(page))
        }

        async fn search_page(&self, query: &str, page: u32) -> Result<Vec<ListItem>> {
            self.answer(Call::Search(String::from(query), page))
        }

        async fn fetch_detail(&self, id: u64) -> Result<MovieDetail> {
            bail!("detail {id} not scripted")
        }
    }

    fn items(start: u64, count: u64) -> Vec<ListItem> {
        (start..start + count)
            .map(|id| ListItem {
                id,
                title: format!("Movie {id}"),
                year: Some(2000),
                genres: vec![String::from("Drama")],
                overview: String::new(),
                rating: 7.5,
                poster_url: String::new(),
            })
            .collect()
    }

    fn ids(state: &FetchState) -> Vec<u64> {
        state.items().iter().map(|item| item.id).collect()
    }

    async fn loaded(
        responses: Vec<Result<Vec<ListItem>, String>>,
    ) -> (Arc<ScriptedCatalog>, FetchController<ScriptedCatalog>) {
        let catalog = ScriptedCatalog::with(responses);
        let mut controller = FetchController::new(Arc::clone(&catalog));
        controller.load_initial();
        controller.next_event().await.unwrap();
        (catalog, controller)
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_initial_replaces_items() {
        // Arrange
        let catalog = ScriptedCatalog::with(vec![Ok(items(1, 20))]);
        let mut controller = FetchController::new(Arc::clone(&catalog));

        // Act
        controller.load_initial();
        let status_while_loading = controller.state().status().clone();
        let event = controller.next_event().await.unwrap();

        // Assert
        assert_eq!(status_while_loading, FetchStatus::InitialLoading);
        assert_eq!(
            event,
            FetchEvent::PageLoaded {
                kind: RequestKind::Initial,
                page: 1,
                count: 20
            }
        );
        let state = controller.state();
        assert_eq!(state.items().len(), 20);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.mode(), ListMode::Browsing);
        assert_eq!(state.status(), &FetchStatus::Idle);
        assert_eq!(catalog.calls(), vec![Call::Browse(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_initial_ignored_while_loading() {
        // Arrange
        let catalog = ScriptedCatalog::with(vec![Ok(items(1, 5))]);
        let mut controller = FetchController::new(Arc::clone(&catalog));

        // Act
        controller.load_initial();
        controller.load_initial();
        controller.next_event().await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Assert
        assert_eq!(catalog.calls(), vec![Call::Browse(1)]);
        assert!(controller.try_next_event().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_browse_then_load_more_then_search() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![
            Ok(items(1, 20)),
            Ok(items(21, 15)),
            Ok(items(603, 3)),
        ])
        .await;

        // Act
        controller.load_more();
        controller.next_event().await.unwrap();
        let after_more = (controller.state().items().len(), controller.state().current_page());
        controller.search("matrix");
        let started = controller.next_event().await.unwrap();
        let loaded = controller.next_event().await.unwrap();

        // Assert
        assert_eq!(after_more, (35, 2));
        assert_eq!(
            started,
            FetchEvent::SearchStarted {
                query: String::from("matrix")
            }
        );
        assert_eq!(
            loaded,
            FetchEvent::PageLoaded {
                kind: RequestKind::Search,
                page: 1,
                count: 3
            }
        );
        let state = controller.state();
        assert_eq!(ids(state), vec![603, 604, 605]);
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.mode(), ListMode::Searching);
        assert_eq!(state.active_query(), "matrix");
        assert_eq!(
            catalog.calls(),
            vec![
                Call::Browse(1),
                Call::Browse(2),
                Call::Search(String::from("matrix"), 1)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_typing_sends_one_search() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![Ok(items(1, 20)), Ok(items(100, 4))]).await;

        // Act
        controller.search("b");
        controller.search("ba");
        controller.search("bat");
        controller.search("batman");
        let status_while_typing = controller.state().status().clone();
        let started = controller.next_event().await.unwrap();
        controller.next_event().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        // Assert
        assert_eq!(status_while_typing, FetchStatus::SearchDebouncing);
        assert_eq!(
            started,
            FetchEvent::SearchStarted {
                query: String::from("batman")
            }
        );
        assert_eq!(
            catalog.calls(),
            vec![Call::Browse(1), Call::Search(String::from("batman"), 1)]
        );
        assert!(controller.try_next_event().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_waits_for_quiet_period() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![Ok(items(1, 20)), Ok(items(100, 1))]).await;

        // Act
        controller.search("dune");
        tokio::time::sleep(Duration::from_millis(399)).await;
        let before_delay = catalog.calls().len();
        controller.next_event().await.unwrap();

        // Assert
        assert_eq!(before_delay, 1);
        assert_eq!(controller.state().search_input(), "dune");
        assert_eq!(controller.state().status(), &FetchStatus::LoadingQuery);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_query_sent_verbatim() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![Ok(items(1, 20)), Ok(items(100, 1))]).await;

        // Act
        controller.search("  the matrix & co ");
        controller.next_event().await.unwrap();
        controller.next_event().await.unwrap();

        // Assert
        assert_eq!(controller.state().active_query(), "  the matrix & co ");
        assert_eq!(
            catalog.calls().last(),
            Some(&Call::Search(String::from("  the matrix & co "), 1))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_search_reloads_browse_immediately() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![
            Ok(items(1, 20)),
            Ok(items(100, 5)),
            Ok(items(1, 20)),
        ])
        .await;
        controller.search("batman");
        controller.next_event().await.unwrap();
        controller.next_event().await.unwrap();

        // Act
        controller.search("   ");
        let status_after_clear = controller.state().status().clone();
        let event = controller.next_event().await.unwrap();

        // Assert
        assert_eq!(status_after_clear, FetchStatus::LoadingQuery);
        assert_eq!(
            event,
            FetchEvent::PageLoaded {
                kind: RequestKind::ClearSearch,
                page: 1,
                count: 20
            }
        );
        let state = controller.state();
        assert_eq!(state.mode(), ListMode::Browsing);
        assert_eq!(state.active_query(), "");
        assert_eq!(state.current_page(), 1);
        assert_eq!(ids(state), (1..=20).collect::<Vec<_>>());
        assert_eq!(catalog.calls().last(), Some(&Call::Browse(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_search_cancels_pending_timer() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![Ok(items(1, 20)), Ok(items(1, 20))]).await;

        // Act
        controller.search("matrix");
        controller.search("");
        controller.next_event().await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        // Assert
        assert!(controller.try_next_event().is_none());
        assert_eq!(catalog.calls(), vec![Call::Browse(1), Call::Browse(1)]);
        assert_eq!(controller.state().mode(), ListMode::Browsing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_appends_next_page() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![Ok(items(1, 20)), Ok(items(21, 20))]).await;

        // Act
        controller.load_more();
        let status_while_loading = controller.state().status().clone();
        let event = controller.next_event().await.unwrap();

        // Assert
        assert_eq!(status_while_loading, FetchStatus::LoadingMore);
        assert_eq!(
            event,
            FetchEvent::PageLoaded {
                kind: RequestKind::LoadMore,
                page: 2,
                count: 20
            }
        );
        assert_eq!(ids(controller.state()), (1..=40).collect::<Vec<_>>());
        assert_eq!(controller.state().current_page(), 2);
        assert_eq!(catalog.calls(), vec![Call::Browse(1), Call::Browse(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_ignored_while_loading_more() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![Ok(items(1, 20)), Ok(items(21, 20))]).await;

        // Act
        controller.load_more();
        controller.load_more();
        controller.load_more();
        controller.next_event().await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Assert
        assert_eq!(catalog.calls(), vec![Call::Browse(1), Call::Browse(2)]);
        assert_eq!(controller.state().current_page(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_ignored_during_initial_refresh_and_debounce() {
        // Arrange
        let catalog = ScriptedCatalog::with(vec![Ok(items(1, 20))]);
        let mut controller = FetchController::new(Arc::clone(&catalog));

        // Act & Assert: initial load
        controller.load_initial();
        controller.load_more();
        assert_eq!(controller.state().status(), &FetchStatus::InitialLoading);
        controller.next_event().await.unwrap();

        // Act & Assert: refresh
        catalog.push(Ok(items(1, 20)));
        controller.refresh();
        controller.load_more();
        assert_eq!(controller.state().status(), &FetchStatus::Refreshing);
        controller.next_event().await.unwrap();

        // Act & Assert: pending search
        controller.search("alien");
        controller.load_more();
        assert_eq!(controller.state().status(), &FetchStatus::SearchDebouncing);

        assert_eq!(catalog.calls(), vec![Call::Browse(1), Call::Browse(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_page_marks_end_of_results() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![Ok(items(1, 2)), Ok(Vec::new())]).await;

        // Act
        controller.load_more();
        controller.next_event().await.unwrap();
        controller.load_more();

        // Assert
        let state = controller.state();
        assert!(state.end_of_results());
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.items().len(), 2);
        assert_eq!(state.status(), &FetchStatus::Idle);
        assert_eq!(catalog.calls(), vec![Call::Browse(1), Call::Browse(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_clears_end_of_results() {
        // Arrange
        let (_catalog, mut controller) =
            loaded(vec![Ok(items(1, 2)), Ok(Vec::new()), Ok(items(1, 3))]).await;
        controller.load_more();
        controller.next_event().await.unwrap();

        // Act
        controller.refresh();
        controller.next_event().await.unwrap();

        // Assert
        assert!(!controller.state().end_of_results());
        assert_eq!(controller.state().items().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_more_retries_same_page_after_failure() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![
            Ok(items(1, 20)),
            Err(String::from("HTTP 503")),
            Ok(items(21, 20)),
        ])
        .await;

        // Act
        controller.load_more();
        let failed = controller.next_event().await.unwrap();
        let page_after_failure = controller.state().current_page();
        controller.load_more();
        controller.next_event().await.unwrap();

        // Assert
        assert!(matches!(
            failed,
            FetchEvent::Failed {
                kind: RequestKind::LoadMore,
                ..
            }
        ));
        assert_eq!(page_after_failure, 1);
        assert_eq!(controller.state().current_page(), 2);
        assert_eq!(
            catalog.calls(),
            vec![Call::Browse(1), Call::Browse(2), Call::Browse(2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_items() {
        // Arrange
        let (_catalog, mut controller) = loaded(vec![
            Ok(items(1, 20)),
            Err(String::from("connection refused")),
        ])
        .await;
        let before = controller.state().items().to_vec();

        // Act
        controller.refresh();
        controller.next_event().await.unwrap();

        // Assert
        let state = controller.state();
        assert_eq!(state.items(), before.as_slice());
        assert_eq!(
            state.status(),
            &FetchStatus::Error(FetchError::FetchFailed(String::from(
                "connection refused"
            )))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_search_blocks_load_more_until_reload() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![
            Ok(items(1, 20)),
            Err(String::from("HTTP 500")),
            Ok(items(603, 3)),
        ])
        .await;
        controller.search("matrix");
        controller.next_event().await.unwrap();
        let failed = controller.next_event().await.unwrap();

        // Act
        let ids_after_failure = ids(controller.state());
        let mode_after_failure = controller.state().mode();
        controller.load_more();
        let needs_reload = controller.state().needs_reload();
        controller.refresh();
        controller.next_event().await.unwrap();

        // Assert
        assert!(matches!(
            failed,
            FetchEvent::Failed {
                kind: RequestKind::Search,
                ..
            }
        ));
        assert_eq!(ids_after_failure, (1..=20).collect::<Vec<_>>());
        assert_eq!(mode_after_failure, ListMode::Searching);
        assert!(needs_reload);
        assert!(!controller.state().needs_reload());
        assert_eq!(ids(controller.state()), vec![603, 604, 605]);
        assert_eq!(
            catalog.calls(),
            vec![
                Call::Browse(1),
                Call::Search(String::from("matrix"), 1),
                Call::Search(String::from("matrix"), 1)
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_uses_active_search() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![
            Ok(items(1, 20)),
            Ok(items(100, 20)),
            Ok(items(120, 20)),
            Ok(items(100, 20)),
        ])
        .await;
        controller.search("star");
        controller.next_event().await.unwrap();
        controller.next_event().await.unwrap();
        controller.load_more();
        controller.next_event().await.unwrap();

        // Act
        controller.refresh();
        controller.next_event().await.unwrap();

        // Assert
        assert_eq!(controller.state().current_page(), 1);
        assert_eq!(controller.state().items().len(), 20);
        assert_eq!(
            catalog.calls().last(),
            Some(&Call::Search(String::from("star"), 1))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_supersedes_initial_load() {
        // Arrange
        let catalog = ScriptedCatalog::with(vec![Ok(items(1, 20))]);
        let mut controller = FetchController::new(Arc::clone(&catalog));

        // Act
        controller.load_initial();
        controller.refresh();
        let event = controller.next_event().await.unwrap();

        // Assert
        assert_eq!(
            event,
            FetchEvent::PageLoaded {
                kind: RequestKind::Refresh,
                page: 1,
                count: 20
            }
        );
        assert_eq!(catalog.calls(), vec![Call::Browse(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_cancels_load_more() {
        // Arrange
        let (catalog, mut controller) =
            loaded(vec![Ok(items(1, 20)), Ok(items(500, 2))]).await;

        // Act
        controller.load_more();
        controller.search("heat");
        controller.next_event().await.unwrap();
        controller.next_event().await.unwrap();

        // Assert
        assert_eq!(ids(controller.state()), vec![500, 501]);
        assert_eq!(
            catalog.calls(),
            vec![Call::Browse(1), Call::Search(String::from("heat"), 1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_response_is_stale() {
        // Arrange
        let (_catalog, mut controller) = loaded(vec![
            Ok(items(1, 20)),
            Ok(items(21, 20)),
            Ok(items(1, 20)),
        ])
        .await;
        controller.load_more();
        tokio::task::yield_now().await;

        // Act
        controller.refresh();
        let first = controller.next_event().await.unwrap();
        let second = controller.next_event().await.unwrap();

        // Assert
        assert_eq!(first, FetchEvent::Stale);
        assert_eq!(
            second,
            FetchEvent::PageLoaded {
                kind: RequestKind::Refresh,
                page: 1,
                count: 20
            }
        );
        assert_eq!(controller.state().items().len(), 20);
        assert_eq!(controller.state().current_page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_error_returns_to_idle() {
        // Arrange
        let (_catalog, mut controller) =
            loaded(vec![Ok(items(1, 20)), Err(String::from("HTTP 502"))]).await;
        controller.refresh();
        controller.next_event().await.unwrap();

        // Act
        let had_error = controller.state().status().error().is_some();
        controller.clear_error();

        // Assert
        assert!(had_error);
        assert_eq!(controller.state().status(), &FetchStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_error_keeps_pending_search() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![
            Ok(items(1, 20)),
            Err(String::from("HTTP 503")),
            Ok(items(700, 2)),
        ])
        .await;
        controller.search("alien");
        controller.refresh();
        controller.next_event().await.unwrap();
        let had_error = controller.state().status().error().is_some();

        // Act
        controller.clear_error();
        let status_after_clear = controller.state().status().clone();
        let started = controller.next_event().await.unwrap();

        // Assert
        assert!(had_error);
        assert_eq!(status_after_clear, FetchStatus::SearchDebouncing);
        assert_eq!(
            started,
            FetchEvent::SearchStarted {
                query: String::from("alien")
            }
        );
        assert_eq!(
            catalog.calls(),
            vec![Call::Browse(1), Call::Browse(1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_initial_load_leaves_empty_list_with_error() {
        // Arrange
        let catalog = ScriptedCatalog::with(vec![Err(String::from("down"))]);
        let mut controller = FetchController::new(Arc::clone(&catalog));

        // Act
        controller.load_initial();
        let event = controller.next_event().await.unwrap();
        controller.load_more();

        // Assert
        assert_eq!(
            event,
            FetchEvent::Failed {
                kind: RequestKind::Initial,
                error: FetchError::FetchFailed(String::from("down"))
            }
        );
        let state = controller.state();
        assert!(state.items().is_empty());
        assert_eq!(
            state.status(),
            &FetchStatus::Error(FetchError::FetchFailed(String::from("down")))
        );
        assert_eq!(state.mode(), ListMode::Browsing);
        assert_eq!(catalog.calls(), vec![Call::Browse(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_reload_keeps_items() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![
            Ok(items(1, 20)),
            Err(String::from("connection reset")),
            Ok(items(1, 20)),
        ])
        .await;
        let before = controller.state().items().to_vec();

        // Act
        controller.load_initial();
        let event = controller.next_event().await.unwrap();
        let items_after_failure = controller.state().items().to_vec();
        let status_after_failure = controller.state().status().clone();
        controller.refresh();
        controller.next_event().await.unwrap();

        // Assert
        assert!(matches!(
            event,
            FetchEvent::Failed {
                kind: RequestKind::Initial,
                ..
            }
        ));
        assert_eq!(items_after_failure, before);
        assert_eq!(
            status_after_failure,
            FetchStatus::Error(FetchError::FetchFailed(String::from("connection reset")))
        );
        assert_eq!(controller.state().status(), &FetchStatus::Idle);
        assert!(!controller.state().needs_reload());
        assert_eq!(
            catalog.calls(),
            vec![Call::Browse(1), Call::Browse(1), Call::Browse(1)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_discards_queued_completion() {
        // Arrange
        let catalog = ScriptedCatalog::with(vec![Ok(items(1, 20))]);
        let mut controller = FetchController::new(Arc::clone(&catalog));
        controller.load_initial();
        tokio::task::yield_now().await;

        // Act
        controller.teardown();
        let event = controller.next_event().await;

        // Assert
        assert!(event.is_none());
        assert!(!controller.is_live());
        assert!(controller.state().items().is_empty());
        assert_eq!(catalog.calls(), vec![Call::Browse(1)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_cancels_pending_search() {
        // Arrange
        let (catalog, mut controller) = loaded(vec![Ok(items(1, 20))]).await;
        controller.search("matrix");

        // Act
        controller.teardown();
        tokio::time::sleep(Duration::from_secs(2)).await;
        controller.search("other");
        controller.load_more();
        controller.refresh();

        // Assert
        assert_eq!(catalog.calls(), vec![Call::Browse(1)]);
        assert_eq!(controller.state().search_input(), "matrix");
        assert!(controller.try_next_event().is_none());
    }
}
