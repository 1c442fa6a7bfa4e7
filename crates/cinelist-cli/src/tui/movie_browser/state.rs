//! Movie browser view state.
//!
//! The list itself lives in the fetch controller; this only tracks what
//! the screen adds on top of it (cursor, search input, detail pane).

use cinelist_api::catalog::{ListItem, MovieDetail};
use ratatui::widgets::TableState;

/// Rows from the bottom at which the next page is requested.
pub const LOAD_MORE_THRESHOLD: usize = 5;

/// Input mode for the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode.
    Normal,
    /// Search text input mode.
    Search,
}

/// Content of the detail pane.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailPane {
    /// Nothing requested yet.
    Empty,
    /// Detail for `id` is loading.
    Loading {
        /// Movie being loaded.
        id: u64,
    },
    /// Detail is shown.
    Loaded(Box<MovieDetail>),
    /// Detail request failed.
    Failed {
        /// Movie that failed to load.
        id: u64,
        /// Failure reason.
        message: String,
    },
}

/// State for the movie browser TUI.
#[derive(Debug)]
pub struct BrowserState {
    /// Table state for the movie list (handles selection and scroll).
    pub table_state: TableState,
    /// Current input mode.
    pub input_mode: InputMode,
    /// Search text being edited.
    pub query: String,
    /// Detail pane content.
    pub detail: DetailPane,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table_state: TableState::default(),
            input_mode: InputMode::Normal,
            query: String::new(),
            detail: DetailPane::Empty,
        }
    }

    /// Returns the cursor position.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    /// Returns the item under the cursor.
    #[must_use]
    pub fn selected<'a>(&self, items: &'a [ListItem]) -> Option<&'a ListItem> {
        items.get(self.table_state.selected()?)
    }

    /// Moves cursor up.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn move_up(&mut self) {
        let current = self.cursor();
        if current > 0 {
            self.table_state.select(Some(current - 1));
        }
    }

    /// Moves cursor down within a list of `len` rows.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn move_down(&mut self, len: usize) {
        let current = self.cursor();
        if current + 1 < len {
            self.table_state.select(Some(current + 1));
        }
    }

    /// Scrolls up by a page.
    pub fn page_up(&mut self, page_size: usize) {
        let current = self.cursor();
        self.table_state
            .select(Some(current.saturating_sub(page_size)));
    }

    /// Scrolls down by a page within a list of `len` rows.
    pub fn page_down(&mut self, len: usize, page_size: usize) {
        if len == 0 {
            return;
        }
        let max = len.saturating_sub(1);
        let current = self.cursor();
        self.table_state
            .select(Some(current.saturating_add(page_size).min(max)));
    }

    /// Puts the cursor on the first row after the list was replaced.
    pub fn reset_cursor(&mut self, len: usize) {
        if len == 0 {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(0));
        }
        *self.table_state.offset_mut() = 0;
    }

    /// Whether the cursor is close enough to the bottom to fetch more.
    #[must_use]
    pub fn near_end(&self, len: usize) -> bool {
        len > 0 && self.cursor().saturating_add(LOAD_MORE_THRESHOLD) >= len
    }

    /// Appends a character to the search text.
    pub fn query_push(&mut self, ch: char) {
        self.query.push(ch);
    }

    /// Removes the last character from the search text.
    pub fn query_pop(&mut self) {
        self.query.pop();
    }

    /// Marks the detail for `id` as loading.
    pub fn begin_detail(&mut self, id: u64) {
        self.detail = DetailPane::Loading { id };
    }

    /// Shows a finished detail request, unless another one was started since.
    pub fn finish_detail(&mut self, id: u64, result: Result<MovieDetail, String>) {
        if self.detail != (DetailPane::Loading { id }) {
            return;
        }
        self.detail = match result {
            Ok(detail) => DetailPane::Loaded(Box::new(detail)),
            Err(message) => DetailPane::Failed { id, message },
        };
    }
}
