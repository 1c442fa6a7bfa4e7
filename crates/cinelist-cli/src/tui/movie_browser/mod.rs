//! Movie browser TUI main loop.
//!
//! Terminal input is read on a blocking task and forwarded over a channel,
//! so the loop can wait on key presses, list completions and detail
//! responses at the same time.

/// Movie browser state types.
pub mod state;
mod ui;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use cinelist_api::catalog::{CatalogApi, MovieDetail};
use cinelist_api::tmdb::{TMDB_WEB_BASE_URL, TmdbClient};
use cinelist_core::{FetchController, FetchEvent, RequestKind};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use self::state::{BrowserState, InputMode};

/// How long the input reader waits for a key before checking for shutdown.
const INPUT_POLL: Duration = Duration::from_millis(100);

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Result of one detail request, keyed by movie ID.
type DetailResult = (u64, Result<MovieDetail, String>);

/// Whether the loop keeps running after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Fetches detail records one at a time; a new request aborts the previous one.
struct DetailLoader<C> {
    client: Arc<C>,
    tx: mpsc::UnboundedSender<DetailResult>,
    rx: mpsc::UnboundedReceiver<DetailResult>,
    task: Option<JoinHandle<()>>,
}

impl<C> DetailLoader<C>
where
    C: CatalogApi + Sync + 'static,
{
    fn new(client: Arc<C>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client,
            tx,
            rx,
            task: None,
        }
    }

    fn request(&mut self, id: u64) {
        self.cancel();
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        self.task = Some(tokio::spawn(async move {
            let result = client
                .fetch_detail(id)
                .await
                .map_err(|err| format!("{err:#}"));
            let _ = tx.send((id, result));
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Runs the movie browser TUI.
///
/// # Errors
///
/// Returns an error if terminal setup or event handling fails.
#[allow(clippy::module_name_repetitions)]
pub async fn run_movie_browser(client: TmdbClient, debounce: Duration) -> Result<()> {
    let client = Arc::new(client);
    let mut controller = FetchController::with_debounce(Arc::clone(&client), debounce);
    let mut details = DetailLoader::new(client);
    let mut state = BrowserState::new();

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let (key_tx, mut key_rx) = mpsc::unbounded_channel();
    let stop = Arc::new(AtomicBool::new(false));
    let reader = spawn_input_reader(key_tx, Arc::clone(&stop));

    let result = run_event_loop(
        &mut terminal,
        &mut controller,
        &mut details,
        &mut state,
        &mut key_rx,
    )
    .await;

    controller.teardown();
    details.cancel();
    stop.store(true, Ordering::Relaxed);
    drop(key_rx);
    match reader.await {
        Ok(Err(err)) => tracing::warn!("input reader failed: {err:#}"),
        Err(err) => tracing::warn!("input reader panicked: {err}"),
        Ok(Ok(())) => {}
    }

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;

    result
}

/// Reads key presses on a blocking thread until `stop` is set or the
/// receiver goes away.
fn spawn_input_reader(
    tx: mpsc::UnboundedSender<KeyEvent>,
    stop: Arc<AtomicBool>,
) -> JoinHandle<Result<()>> {
    tokio::task::spawn_blocking(move || {
        while !stop.load(Ordering::Relaxed) {
            if event::poll(INPUT_POLL).context("failed to poll events")?
                && let Event::Key(key) = event::read().context("failed to read event")?
                && key.kind == KeyEventKind::Press
                && tx.send(key).is_err()
            {
                break;
            }
        }
        Ok(())
    })
}

/// Main event loop.
async fn run_event_loop<C>(
    terminal: &mut Tui,
    controller: &mut FetchController<C>,
    details: &mut DetailLoader<C>,
    state: &mut BrowserState,
    keys: &mut mpsc::UnboundedReceiver<KeyEvent>,
) -> Result<()>
where
    C: CatalogApi + Sync + 'static,
{
    let mut main_area_height: u16 = 0;
    controller.load_initial();

    loop {
        terminal
            .draw(|frame| {
                main_area_height = ui::draw(frame, controller.state(), state);
            })
            .context("failed to draw TUI")?;

        let page_size = usize::from(main_area_height.saturating_sub(4));

        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else {
                    return Ok(());
                };
                if handle_key(key, controller, details, state, page_size) == Flow::Quit {
                    return Ok(());
                }
            }
            Some(event) = controller.next_event() => {
                if let FetchEvent::PageLoaded { kind, .. } = event
                    && kind != RequestKind::LoadMore
                {
                    state.reset_cursor(controller.state().items().len());
                }
            }
            Some((id, result)) = details.rx.recv() => {
                state.finish_detail(id, result);
            }
        }
    }
}

/// Dispatches a key press by input mode.
fn handle_key<C>(
    key: KeyEvent,
    controller: &mut FetchController<C>,
    details: &mut DetailLoader<C>,
    state: &mut BrowserState,
    page_size: usize,
) -> Flow
where
    C: CatalogApi + Sync + 'static,
{
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Flow::Quit;
    }
    match state.input_mode {
        InputMode::Search => {
            handle_search_input(controller, state, key.code);
            Flow::Continue
        }
        InputMode::Normal => handle_normal_input(controller, details, state, key.code, page_size),
    }
}

/// Handles key input in search mode.
fn handle_search_input<C>(controller: &mut FetchController<C>, state: &mut BrowserState, key: KeyCode)
where
    C: CatalogApi + Sync + 'static,
{
    match key {
        KeyCode::Esc => {
            state.query.clear();
            controller.search("");
            state.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            state.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            state.query_pop();
            controller.search(&state.query);
        }
        KeyCode::Char(c) => {
            state.query_push(c);
            controller.search(&state.query);
        }
        _ => {}
    }
}

/// Handles key input in normal mode.
fn handle_normal_input<C>(
    controller: &mut FetchController<C>,
    details: &mut DetailLoader<C>,
    state: &mut BrowserState,
    key: KeyCode,
    page_size: usize,
) -> Flow
where
    C: CatalogApi + Sync + 'static,
{
    let len = controller.state().items().len();
    match key {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Up | KeyCode::Char('k') => state.move_up(),
        KeyCode::Down | KeyCode::Char('j') => state.move_down(len),
        KeyCode::PageUp => state.page_up(page_size),
        KeyCode::PageDown => state.page_down(len, page_size),
        KeyCode::Char('/') => state.input_mode = InputMode::Search,
        KeyCode::Char('r') => controller.refresh(),
        KeyCode::Char('x') => controller.clear_error(),
        KeyCode::Enter => {
            if let Some(item) = state.selected(controller.state().items()) {
                let id = item.id;
                state.begin_detail(id);
                details.request(id);
            }
        }
        KeyCode::Char('o') => open_movie_url(state, controller),
        _ => {}
    }
    if state.near_end(len) {
        controller.load_more();
    }
    Flow::Continue
}

/// Opens the TMDB page for the selected movie.
fn open_movie_url<C>(state: &BrowserState, controller: &FetchController<C>) {
    let Some(item) = state.selected(controller.state().items()) else {
        return;
    };
    let url = format!("{TMDB_WEB_BASE_URL}/movie/{}", item.id);
    if let Err(err) = open::that(&url) {
        tracing::warn!("failed to open {url}: {err}");
    }
}
