//! TUI module for interactive terminal interfaces.
//!
//! Uses `ratatui` + `crossterm` for rendering.

/// Movie list browser TUI.
pub mod movie_browser;

pub use movie_browser::run_movie_browser;
