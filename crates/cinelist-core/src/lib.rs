//! Movie list coordination core for cinelist.
//!
//! Owns the paginated result list of the list screen and coordinates
//! initial load, pull-to-refresh, debounced search and incremental
//! pagination against a `CatalogApi`.

/// Fetch/search controller.
pub mod controller;
mod debounce;
/// Controller error type.
pub mod error;
/// List state types.
pub mod state;

pub use controller::{DEFAULT_DEBOUNCE, FetchController, FetchEvent, RequestKind};
pub use error::FetchError;
pub use state::{FetchState, FetchStatus, ListMode};
