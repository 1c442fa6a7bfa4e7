//! TMDB movie genre table.
//!
//! List endpoints return only `genre_ids`. The movie genre list is
//! fixed on TMDB's side, so it is kept here instead of being fetched
//! from `genre/movie/list` on every run.

/// `(id, name)` pairs for TMDB movie genres (English names).
const MOVIE_GENRES: &[(u32, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Science Fiction"),
    (10770, "TV Movie"),
    (53, "Thriller"),
    (10752, "War"),
    (37, "Western"),
];

/// Returns the genre name for a TMDB movie genre ID.
#[must_use]
pub fn genre_name(id: u32) -> Option<&'static str> {
    MOVIE_GENRES
        .iter()
        .find(|(genre_id, _)| *genre_id == id)
        .map(|(_, name)| *name)
}

/// Maps genre IDs to names, preserving order and dropping unknown IDs.
#[must_use]
pub fn genre_names(ids: &[u32]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| genre_name(*id))
        .map(String::from)
        .collect()
}
