//! Normalized catalog records.

/// Summary record for one movie in a result list.
///
/// Produced already normalized by the catalog client: image URLs are
/// fully qualified or empty, the year is derived, the rating defaults
/// to `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// Catalog ID. Unique within one result set only.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Release year; `None` when the release date is missing or invalid.
    pub year: Option<i32>,
    /// Genre names (possibly empty).
    pub genres: Vec<String>,
    /// Plot summary (possibly empty).
    pub overview: String,
    /// Average rating; `0.0` means unrated.
    pub rating: f64,
    /// Poster URL; empty when there is no image.
    pub poster_url: String,
}

impl ListItem {
    /// Returns `true` if the movie has a rating.
    #[must_use]
    pub fn is_rated(&self) -> bool {
        self.rating > 0.0
    }
}

/// Full detail record for one movie.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieDetail {
    /// Catalog ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Original title.
    pub original_title: String,
    /// Tagline.
    pub tagline: Option<String>,
    /// Release year; `None` when the release date is missing or invalid.
    pub year: Option<i32>,
    /// Raw release date (YYYY-MM-DD).
    pub release_date: Option<String>,
    /// Genre names.
    pub genres: Vec<String>,
    /// Plot summary (possibly empty).
    pub overview: String,
    /// Average rating; `0.0` means unrated.
    pub rating: f64,
    /// Number of votes behind `rating`.
    pub vote_count: u32,
    /// Runtime in minutes.
    pub runtime_minutes: Option<u32>,
    /// Poster URL; empty when there is no image.
    pub poster_url: String,
    /// Backdrop URL; empty when there is no image.
    pub backdrop_url: String,
    /// Original language (ISO 639-1).
    pub original_language: String,
    /// Production country names.
    pub production_countries: Vec<String>,
    /// Production company names.
    pub production_companies: Vec<String>,
    /// Box office revenue in USD; `None` when unknown.
    pub revenue: Option<u64>,
    /// Official homepage.
    pub homepage: Option<String>,
    /// Director name, if credits were available.
    pub director: Option<String>,
    /// Top-billed cast names.
    pub cast: Vec<String>,
}
