//! Movie catalog client library for cinelist.
//!
//! Provides the `CatalogApi` abstraction consumed by the list controller
//! and its TMDB implementation.

/// Catalog abstraction and normalized records.
pub mod catalog;

/// TMDB API client.
pub mod tmdb;
