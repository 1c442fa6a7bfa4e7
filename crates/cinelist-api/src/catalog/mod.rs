//! Catalog abstraction.
//!
//! Everything above this module sees movies only as normalized
//! `ListItem` / `MovieDetail` records; raw TMDB payloads stay inside
//! the `tmdb` module.

mod api;
mod model;

#[allow(clippy::module_name_repetitions)]
pub use api::{CatalogApi, LocalCatalogApi};
pub use model::{ListItem, MovieDetail};
