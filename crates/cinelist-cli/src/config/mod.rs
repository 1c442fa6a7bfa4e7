//! Application configuration module.
//!
//! Manages the TOML config file holding catalog and list-screen
//! settings. The API token is never stored here.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{AppConfig, BrowseConfig, TmdbConfig};
pub use paths::resolve_config_path;
