//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 movie endpoints and
//! normalizes the payloads into catalog records.

mod client;
mod genres;
mod normalize;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
pub use genres::{genre_name, genre_names};
pub use normalize::{IMAGE_BASE_URL, image_url, release_year};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    PopularMoviesParams, SearchMovieParams, TmdbCredits, TmdbMovieDetails, TmdbMovieListResponse,
    TmdbMovieResult,
};

/// Base URL of the public TMDB website (for opening movie pages).
pub const TMDB_WEB_BASE_URL: &str = "https://www.themoviedb.org";
