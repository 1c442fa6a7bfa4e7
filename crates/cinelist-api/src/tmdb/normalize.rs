//! Conversion of raw TMDB payloads into normalized catalog records.

use chrono::{Datelike, NaiveDate};

use super::genres::genre_names;
use super::types::{TmdbCredits, TmdbMovieDetails, TmdbMovieResult};
use crate::catalog::{ListItem, MovieDetail};

/// Base URL for poster/backdrop images.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Number of cast names kept on a detail record.
const TOP_CAST: usize = 5;

/// Builds a full image URL from a TMDB image path.
///
/// Returns an empty string when the path is absent or empty.
#[must_use]
pub fn image_url(path: Option<&str>) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{IMAGE_BASE_URL}{p}"),
        _ => String::new(),
    }
}

/// Extracts the year from a `YYYY-MM-DD` release date.
///
/// Empty, missing, or malformed dates yield `None`.
#[must_use]
pub fn release_year(date: Option<&str>) -> Option<i32> {
    let date = date?.trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year())
}

/// Converts a list result into a `ListItem`.
#[must_use]
pub fn to_list_item(movie: TmdbMovieResult) -> ListItem {
    ListItem {
        id: movie.id,
        year: release_year(movie.release_date.as_deref()),
        genres: genre_names(&movie.genre_ids),
        overview: movie.overview.unwrap_or_default(),
        rating: movie.vote_average.unwrap_or(0.0),
        poster_url: image_url(movie.poster_path.as_deref()),
        title: movie.title,
    }
}

/// Converts movie details plus (optional) credits into a `MovieDetail`.
#[must_use]
pub fn to_movie_detail(details: TmdbMovieDetails, credits: Option<TmdbCredits>) -> MovieDetail {
    let (director, cast) = credits.map_or((None, Vec::new()), |c| {
        let director = c
            .crew
            .iter()
            .find(|m| m.job == "Director")
            .map(|m| m.name.clone());
        let mut cast = c.cast;
        cast.sort_by_key(|m| m.order);
        let cast = cast.into_iter().take(TOP_CAST).map(|m| m.name).collect();
        (director, cast)
    });

    MovieDetail {
        id: details.id,
        year: release_year(details.release_date.as_deref()),
        release_date: details.release_date.filter(|d| !d.is_empty()),
        genres: details.genres.into_iter().map(|g| g.name).collect(),
        overview: details.overview.unwrap_or_default(),
        rating: details.vote_average.unwrap_or(0.0),
        vote_count: details.vote_count,
        runtime_minutes: details.runtime.filter(|r| *r > 0),
        poster_url: image_url(details.poster_path.as_deref()),
        backdrop_url: image_url(details.backdrop_path.as_deref()),
        original_language: details.original_language,
        production_countries: details
            .production_countries
            .into_iter()
            .map(|c| c.name)
            .collect(),
        production_companies: details
            .production_companies
            .into_iter()
            .map(|c| c.name)
            .collect(),
        revenue: (details.revenue > 0).then_some(details.revenue),
        homepage: details.homepage.filter(|h| !h.is_empty()),
        tagline: details.tagline.filter(|t| !t.is_empty()),
        director,
        cast,
        title: details.title,
        original_title: details.original_title,
    }
}
