//! TUI rendering logic for the movie browser.

use cinelist_api::catalog::MovieDetail;
use cinelist_core::{FetchState, FetchStatus, ListMode};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Wrap};

use super::state::{BrowserState, DetailPane, InputMode};

/// Formats a number with thousands separators (e.g. 463517383 -> "463,517,383").
#[allow(clippy::arithmetic_side_effects)]
fn fmt_num(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// One-line description of what the list is doing.
pub fn status_label(fetch: &FetchState) -> String {
    match fetch.status() {
        FetchStatus::Idle if fetch.end_of_results() => String::from("end of results"),
        FetchStatus::Idle => String::new(),
        FetchStatus::InitialLoading => String::from("loading..."),
        FetchStatus::Refreshing => String::from("refreshing..."),
        FetchStatus::LoadingMore => {
            format!("loading page {}...", fetch.current_page().saturating_add(1))
        }
        FetchStatus::SearchDebouncing => String::from("waiting for input..."),
        FetchStatus::LoadingQuery => String::from("searching..."),
        FetchStatus::Error(err) => format!("error: {err} (x to dismiss, r to retry)"),
    }
}

/// Draws the browser UI. Returns the list area height for page size calculation.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, fetch: &FetchState, state: &mut BrowserState) -> u16 {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search + status
            Constraint::Min(5),    // list + detail
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_header(frame, chunks[0], fetch, state);

    let main_area = chunks[1];
    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_area);

    draw_movie_list(frame, pane_chunks[0], fetch, state);
    draw_detail(frame, pane_chunks[1], &state.detail);

    draw_footer(frame, chunks[2], state);

    main_area.height
}

/// Draws the search input and list status.
#[allow(clippy::indexing_slicing)]
fn draw_header(frame: &mut Frame, area: Rect, fetch: &FetchState, state: &BrowserState) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let search_style = if state.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(state.query.as_str())
        .style(search_style)
        .block(Block::default().borders(Borders::ALL).title(" Search: / "));
    frame.render_widget(search, header_chunks[0]);

    let title = match fetch.mode() {
        ListMode::Browsing => String::from(" Popular "),
        ListMode::Searching => format!(" \"{}\" ", fetch.active_query()),
    };
    let status_style = if fetch.status().error().is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let status = Paragraph::new(Line::from(vec![
        Span::raw(format!(
            "{} movies  p.{}  ",
            fetch.items().len(),
            fetch.current_page()
        )),
        Span::styled(status_label(fetch), status_style),
    ]))
    .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(status, header_chunks[1]);
}

/// Draws the movie list pane (left).
fn draw_movie_list(frame: &mut Frame, area: Rect, fetch: &FetchState, state: &mut BrowserState) {
    let header = Row::new(vec!["Year", "Rating", "Title", "Genres"])
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(1);

    let rows: Vec<Row> = fetch
        .items()
        .iter()
        .map(|item| {
            let style = if item.is_rated() {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                item.year
                    .map_or_else(|| String::from("----"), |y| y.to_string()),
                if item.is_rated() {
                    format!("{:.1}", item.rating)
                } else {
                    String::from("--")
                },
                item.title.clone(),
                item.genres.join(", "),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Percentage(30),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Movies "))
        .row_highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_stateful_widget(table, area, &mut state.table_state);
}

/// Builds the detail pane lines for a loaded movie.
fn detail_lines(detail: &MovieDetail) -> Vec<Line<'_>> {
    let label = Style::default().fg(Color::Yellow);
    let mut lines = vec![Line::from(Span::styled(
        format!(
            "{} ({})",
            detail.title,
            detail
                .year
                .map_or_else(|| String::from("----"), |y| y.to_string())
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    if let Some(tagline) = &detail.tagline {
        lines.push(Line::from(Span::styled(
            tagline.as_str(),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::default());

    let mut field = |name: &'static str, value: String| {
        lines.push(Line::from(vec![
            Span::styled(format!("{name:<10}"), label),
            Span::raw(value),
        ]));
    };
    field("Rating", format!("{:.1} ({} votes)", detail.rating, detail.vote_count));
    field("Genres", detail.genres.join(", "));
    if let Some(date) = &detail.release_date {
        field("Released", date.clone());
    }
    if let Some(runtime) = detail.runtime_minutes {
        field("Runtime", format!("{runtime} min"));
    }
    if let Some(director) = &detail.director {
        field("Director", director.clone());
    }
    if !detail.cast.is_empty() {
        field("Cast", detail.cast.join(", "));
    }
    if let Some(revenue) = detail.revenue {
        field("Revenue", format!("${}", fmt_num(revenue)));
    }
    if !detail.production_countries.is_empty() {
        field("Country", detail.production_countries.join(", "));
    }

    lines.push(Line::default());
    lines.push(Line::from(detail.overview.as_str()));
    lines
}

/// Draws the detail pane (right).
fn draw_detail(frame: &mut Frame, area: Rect, detail: &DetailPane) {
    let lines = match detail {
        DetailPane::Empty => vec![Line::from(Span::styled(
            "Enter: show details",
            Style::default().fg(Color::DarkGray),
        ))],
        DetailPane::Loading { id } => vec![Line::from(format!("loading movie {id}..."))],
        DetailPane::Loaded(detail) => detail_lines(detail),
        DetailPane::Failed { id, message } => vec![Line::from(Span::styled(
            format!("movie {id}: {message}"),
            Style::default().fg(Color::Red),
        ))],
    };

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Details "));
    frame.render_widget(paragraph, area);
}

/// Draws the key help footer.
fn draw_footer(frame: &mut Frame, area: Rect, state: &BrowserState) {
    let help = match state.input_mode {
        InputMode::Normal => {
            " q: Quit  j/k: Move  PgUp/PgDn: Page  /: Search  r: Refresh  Enter: Details  o: Open  x: Dismiss"
        }
        InputMode::Search => " Type to search  Enter: Done  Esc: Clear search",
    };
    let footer = Paragraph::new(help)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}
