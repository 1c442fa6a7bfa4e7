//! `CatalogApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::model::{ListItem, MovieDetail};

/// Paginated movie catalog.
///
/// Abstracts the remote catalog for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait,
/// which is what the list controller requires to spawn requests.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Fetches one page of the popular (browsing) listing.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success HTTP status,
    /// or a malformed payload.
    async fn fetch_page(&self, page: u32) -> Result<Vec<ListItem>>;

    /// Fetches one page of movies matching `query`.
    ///
    /// The query is sent verbatim; URL encoding is the transport's job.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success HTTP status,
    /// or a malformed payload.
    async fn search_page(&self, query: &str, page: u32) -> Result<Vec<ListItem>>;

    /// Fetches the full detail record for one movie.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success HTTP status,
    /// or a malformed payload.
    async fn fetch_detail(&self, id: u64) -> Result<MovieDetail>;
}
