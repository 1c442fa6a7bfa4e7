//! Observable state of the movie list.

use cinelist_api::catalog::ListItem;

use crate::error::FetchError;

/// Which listing the items belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    /// Popular movies.
    #[default]
    Browsing,
    /// Results for the active query.
    Searching,
}

/// Current fetch activity of the list.
///
/// At most one variant holds at a time. `Error` is sticky until another
/// operation starts or `clear_error` is called.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// Nothing in progress.
    #[default]
    Idle,
    /// First page of the browse listing is loading.
    InitialLoading,
    /// Page 1 of the active context is being re-fetched.
    Refreshing,
    /// The next page is loading.
    LoadingMore,
    /// A search is scheduled but its quiet period has not elapsed.
    SearchDebouncing,
    /// Page 1 of a new context (search or cleared search) is loading.
    LoadingQuery,
    /// The last request failed.
    Error(FetchError),
}

impl FetchStatus {
    /// Returns `true` while a request or debounce timer is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::InitialLoading
                | Self::Refreshing
                | Self::LoadingMore
                | Self::SearchDebouncing
                | Self::LoadingQuery
        )
    }

    /// Returns the error if the status is `Error`.
    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// State owned by `FetchController`.
///
/// Only the controller mutates it; everything else reads through the
/// accessors.
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    pub(crate) items: Vec<ListItem>,
    pub(crate) current_page: u32,
    pub(crate) mode: ListMode,
    pub(crate) active_query: String,
    pub(crate) status: FetchStatus,
    pub(crate) search_input: String,
    pub(crate) end_of_results: bool,
    pub(crate) needs_reload: bool,
}

impl FetchState {
    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    /// Last page successfully applied for the active context (0 before any load).
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Listing the items belong to.
    #[must_use]
    pub const fn mode(&self) -> ListMode {
        self.mode
    }

    /// Query behind the current search results (empty while browsing).
    #[must_use]
    pub fn active_query(&self) -> &str {
        &self.active_query
    }

    /// Current fetch activity.
    #[must_use]
    pub const fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// Text last passed to `search`, which may still be debouncing.
    #[must_use]
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Whether the last `load_more` came back empty.
    #[must_use]
    pub const fn end_of_results(&self) -> bool {
        self.end_of_results
    }

    /// Whether the items belong to a context other than the active one.
    ///
    /// Set when a search or search-clear starts and cleared once its
    /// first page is applied. While set, `load_more` does nothing.
    #[must_use]
    pub const fn needs_reload(&self) -> bool {
        self.needs_reload
    }

    /// Switches to a new listing context, starting again from page 1.
    pub(crate) fn enter_context(&mut self, mode: ListMode, query: String) {
        self.mode = mode;
        self.active_query = query;
        self.current_page = 1;
        self.end_of_results = false;
        self.needs_reload = true;
    }
}
