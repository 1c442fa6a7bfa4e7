//! `TmdbClient` - TMDB API client implementation.

use anyhow::{Context, Result, bail};
use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::normalize::{to_list_item, to_movie_detail};
use super::types::{
    PopularMoviesParams, SearchMovieParams, TmdbCredits, TmdbErrorResponse, TmdbMovieDetails,
    TmdbMovieListResponse,
};
use crate::catalog::{CatalogApi, ListItem, MovieDetail};

/// Default base URL for TMDB API v3.
const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3/";

/// Default response language.
const DEFAULT_LANGUAGE: &str = "en-US";

/// TMDB API client.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// Bearer API token.
    api_token: String,
    /// Response language for catalog requests.
    language: String,
}

/// Builder for `TmdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TmdbClientBuilder {
    base_url: Option<Url>,
    api_token: Option<String>,
    user_agent: Option<String>,
    language: Option<String>,
}

impl TmdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_token: None,
            user_agent: None,
            language: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API bearer token (required).
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the User-Agent (required).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the response language for catalog requests (default: "en-US").
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_token` is not set.
    /// - `user_agent` is not set.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TmdbClient> {
        let api_token = self.api_token.context("api_token is required")?;
        let user_agent = self.user_agent.context("user_agent is required")?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            let result = Url::parse(DEFAULT_BASE_URL);
            result.context("invalid default base URL")?
        };

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;

        Ok(TmdbClient {
            http_client,
            base_url,
            api_token,
            language: self
                .language
                .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE)),
        })
    }
}

impl TmdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TmdbClientBuilder {
        TmdbClientBuilder::new()
    }

    /// Returns the response language used for catalog requests.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Sends a GET request with Bearer auth and query params.
    ///
    /// Transport failures, non-success statuses and undecodable bodies
    /// all surface as errors; nothing is retried.
    #[instrument(skip_all, fields(path = path))]
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self
            .base_url
            .join(path)
            .with_context(|| format!("failed to join URL path: {path}"))?;

        let request = self
            .http_client
            .get(url)
            .bearer_auth(&self.api_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .build()
            .with_context(|| format!("failed to build request: {path}"))?;

        tracing::debug!(url = %request.url(), "TMDB API request");

        let result = self.http_client.execute(request).await;
        let response = result.with_context(|| format!("request failed: {path}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<failed to read body>"));
            if let Ok(error_response) = serde_json::from_str::<TmdbErrorResponse>(&body) {
                bail!(
                    "TMDB API error (HTTP {}): code={}, message={}",
                    status,
                    error_response.status_code,
                    error_response.status_message,
                );
            }
            bail!("TMDB API error (HTTP {status}): {body}");
        }

        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read response body: {path}"))?;
        let raw_result: std::result::Result<T, _> = serde_json::from_str(&body);
        let parsed =
            raw_result.with_context(|| format!("failed to decode JSON response: {path}"))?;
        Ok(parsed)
    }

    /// Fetches one page of popular movies (raw payload).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    #[instrument(skip_all, fields(page = params.page))]
    pub async fn popular_movies(
        &self,
        params: &PopularMoviesParams,
    ) -> Result<TmdbMovieListResponse> {
        let query: Vec<(&str, String)> = vec![
            ("language", params.language.clone()),
            ("page", params.page.to_string()),
        ];
        self.get_json("movie/popular", &query).await
    }

    /// Searches for movies (raw payload).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    #[instrument(skip_all, fields(page = params.page))]
    pub async fn search_movie(&self, params: &SearchMovieParams) -> Result<TmdbMovieListResponse> {
        let query: Vec<(&str, String)> = vec![
            ("query", params.query.clone()),
            ("language", params.language.clone()),
            ("page", params.page.to_string()),
            ("include_adult", params.include_adult.to_string()),
        ];
        self.get_json("search/movie", &query).await
    }

    /// Fetches movie details (raw payload).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    #[instrument(skip_all, fields(movie_id = movie_id))]
    pub async fn movie_details(&self, movie_id: u64, language: &str) -> Result<TmdbMovieDetails> {
        let path = format!("movie/{movie_id}");
        let query = [("language", String::from(language))];
        self.get_json(&path, &query).await
    }

    /// Fetches movie credits (raw payload).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or JSON parsing fails.
    #[instrument(skip_all, fields(movie_id = movie_id))]
    pub async fn movie_credits(&self, movie_id: u64, language: &str) -> Result<TmdbCredits> {
        let path = format!("movie/{movie_id}/credits");
        let query = [("language", String::from(language))];
        self.get_json(&path, &query).await
    }
}

impl CatalogApi for TmdbClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<ListItem>> {
        let params = PopularMoviesParams::new(page).language(&self.language);
        let response = self
            .popular_movies(&params)
            .await
            .context("failed to fetch popular movies")?;
        Ok(response.results.into_iter().map(to_list_item).collect())
    }

    async fn search_page(&self, query: &str, page: u32) -> Result<Vec<ListItem>> {
        let params = SearchMovieParams::new(query)
            .language(&self.language)
            .page(page);
        let response = self
            .search_movie(&params)
            .await
            .context("failed to search movies")?;
        Ok(response.results.into_iter().map(to_list_item).collect())
    }

    async fn fetch_detail(&self, id: u64) -> Result<MovieDetail> {
        let details = self
            .movie_details(id, &self.language)
            .await
            .context("failed to fetch movie details")?;

        // Credits are optional; the details are returned without them.
        let credits = match self.movie_credits(id, &self.language).await {
            Ok(credits) => Some(credits),
            Err(err) => {
                tracing::warn!(movie_id = id, error = %format!("{err:#}"), "TMDB credits unavailable");
                None
            }
        };

        Ok(to_movie_detail(details, credits))
    }
}
