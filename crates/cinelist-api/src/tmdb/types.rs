//! TMDB API response types and request parameters.

use serde::Deserialize;

// --- Movie lists (popular / search) ---

/// Paginated response from `movie/popular` and `search/movie`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieListResponse {
    /// Current page number.
    pub page: u32,
    /// Results on this page.
    pub results: Vec<TmdbMovieResult>,
    /// Total number of pages.
    #[serde(default)]
    pub total_pages: u32,
    /// Total number of results.
    #[serde(default)]
    pub total_results: u32,
}

/// A single movie in a list response.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieResult {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Original title.
    #[serde(default)]
    pub original_title: Option<String>,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: Option<String>,
    /// Release date (YYYY-MM-DD, empty, or null).
    #[serde(default)]
    pub release_date: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Popularity score.
    #[serde(default)]
    pub popularity: f64,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Genre IDs.
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
}

// --- Movie details ---

/// Response from `movie/{movie_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title.
    pub title: String,
    /// Original title.
    #[serde(default)]
    pub original_title: String,
    /// Original language (ISO 639-1).
    #[serde(default)]
    pub original_language: String,
    /// Tagline.
    #[serde(default)]
    pub tagline: Option<String>,
    /// Release date.
    #[serde(default)]
    pub release_date: Option<String>,
    /// Overview text.
    #[serde(default)]
    pub overview: Option<String>,
    /// Genres.
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    /// Vote average.
    #[serde(default)]
    pub vote_average: Option<f64>,
    /// Vote count.
    #[serde(default)]
    pub vote_count: u32,
    /// Runtime in minutes.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Revenue in USD (0 when unknown).
    #[serde(default)]
    pub revenue: u64,
    /// Homepage URL (may be empty).
    #[serde(default)]
    pub homepage: Option<String>,
    /// Release status (e.g., "Released").
    #[serde(default)]
    pub status: Option<String>,
    /// Poster image path.
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Backdrop image path.
    #[serde(default)]
    pub backdrop_path: Option<String>,
    /// Production companies.
    #[serde(default)]
    pub production_companies: Vec<TmdbProductionCompany>,
    /// Production countries.
    #[serde(default)]
    pub production_countries: Vec<TmdbProductionCountry>,
}

/// Genre entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    /// Genre ID.
    pub id: u32,
    /// Genre name.
    pub name: String,
}

/// Production company entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbProductionCompany {
    /// Company ID.
    pub id: u64,
    /// Company name.
    pub name: String,
}

/// Production country entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbProductionCountry {
    /// ISO 3166-1 country code.
    pub iso_3166_1: String,
    /// Country name.
    pub name: String,
}

// --- Credits ---

/// Response from `movie/{movie_id}/credits`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCredits {
    /// TMDB movie ID.
    pub id: u64,
    /// Cast, in billing order.
    #[serde(default)]
    pub cast: Vec<TmdbCastMember>,
    /// Crew.
    #[serde(default)]
    pub crew: Vec<TmdbCrewMember>,
}

/// A cast member.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCastMember {
    /// Person name.
    pub name: String,
    /// Character played.
    #[serde(default)]
    pub character: Option<String>,
    /// Billing order.
    #[serde(default)]
    pub order: u32,
}

/// A crew member.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbCrewMember {
    /// Person name.
    pub name: String,
    /// Job title (e.g., "Director").
    #[serde(default)]
    pub job: String,
    /// Department (e.g., "Directing").
    #[serde(default)]
    pub department: String,
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
    /// Success flag (always false for errors).
    #[allow(dead_code)]
    #[serde(default)]
    pub success: bool,
}

// --- Request Parameters ---

/// Parameters for `movie/popular`.
#[derive(Debug, Clone)]
pub struct PopularMoviesParams {
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
}

impl PopularMoviesParams {
    /// Creates params for the given page.
    #[must_use]
    pub fn new(page: u32) -> Self {
        Self {
            language: String::from("en-US"),
            page,
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

/// Parameters for `search/movie`.
#[derive(Debug, Clone)]
pub struct SearchMovieParams {
    /// Search query (required).
    pub query: String,
    /// Response language (default: "en-US").
    pub language: String,
    /// Result page (1-500, default: 1).
    pub page: u32,
    /// Include adult content.
    pub include_adult: bool,
}

impl SearchMovieParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: String::from("en-US"),
            page: 1,
            include_adult: false,
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }
}
