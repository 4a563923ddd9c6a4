/// TMDB API provider
///
/// Proxies the upstream movie database: title search, popularity rankings,
/// genre discovery, details, and watch providers. All endpoints take the
/// API key as a query parameter and speak snake_case JSON; responses are
/// mapped into client-facing models at this boundary and cached through
/// Redis.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Movie, MovieDetails, TmdbMovieDetails, TmdbPage, TmdbRegionOffers, TmdbWatchProviders},
    services::source::MovieSource,
};

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const LISTING_CACHE_TTL: u64 = 3600; // 1 hour; popularity pages churn daily
const DETAILS_CACHE_TTL: u64 = 604800; // 1 week
const PROVIDERS_CACHE_TTL: u64 = 604800; // 1 week

/// Upstream calls are bounded; a timeout is treated like any other network
/// failure by the fallback chain.
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Clone)]
pub struct TmdbSource {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbSource {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(UPSTREAM_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            cache,
        })
    }

    /// Performs one upstream GET with the API key attached and decodes the
    /// JSON body. Non-success statuses surface as `ExternalApi`.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "Upstream request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Upstream returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl MovieSource for TmdbSource {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<Movie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::MovieSearch(query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let page: TmdbPage = self
                    .fetch_json(
                        "/search/movie",
                        &[("query", query), ("include_adult", "false")],
                    )
                    .await?;

                let movies: Vec<Movie> = page.results.into_iter().map(Movie::from).collect();

                tracing::info!(
                    query = %query,
                    results = movies.len(),
                    source = "tmdb",
                    "Movie search completed"
                );

                Ok::<_, AppError>(movies)
            }
        )
    }

    async fn popular_movies(&self, page: u32, region: &str) -> AppResult<Vec<Movie>> {
        cached!(
            self.cache,
            CacheKey::Popular {
                region: region.to_string(),
                page,
            },
            LISTING_CACHE_TTL,
            async move {
                let listing: TmdbPage = self
                    .fetch_json(
                        "/movie/popular",
                        &[("page", page.to_string().as_str()), ("region", region)],
                    )
                    .await?;

                let movies: Vec<Movie> = listing.results.into_iter().map(Movie::from).collect();

                tracing::info!(
                    page = page,
                    region = %region,
                    results = movies.len(),
                    source = "tmdb",
                    "Popular page fetched"
                );

                Ok::<_, AppError>(movies)
            }
        )
    }

    async fn discover_by_genres(
        &self,
        genre_ids: &[i64],
        page: u32,
        region: &str,
    ) -> AppResult<Vec<Movie>> {
        let genres = genre_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let genres_param = genres.clone();

        cached!(
            self.cache,
            CacheKey::Discover {
                region: region.to_string(),
                page,
                genres: genres.clone(),
            },
            LISTING_CACHE_TTL,
            async move {
                let listing: TmdbPage = self
                    .fetch_json(
                        "/discover/movie",
                        &[
                            ("with_genres", genres_param.as_str()),
                            ("page", page.to_string().as_str()),
                            ("region", region),
                            ("sort_by", "popularity.desc"),
                            ("include_adult", "false"),
                        ],
                    )
                    .await?;

                Ok::<_, AppError>(listing
                    .results
                    .into_iter()
                    .map(Movie::from)
                    .collect::<Vec<Movie>>())
            }
        )
    }

    async fn movie_details(&self, movie_id: i64) -> AppResult<MovieDetails> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(movie_id),
            DETAILS_CACHE_TTL,
            async move {
                let details: TmdbMovieDetails =
                    self.fetch_json(&format!("/movie/{}", movie_id), &[]).await?;

                Ok::<_, AppError>(MovieDetails::from(details))
            }
        )
    }

    async fn watch_providers(&self, movie_id: i64, region: &str) -> AppResult<TmdbRegionOffers> {
        cached!(
            self.cache,
            CacheKey::Providers {
                movie_id,
                region: region.to_string(),
            },
            PROVIDERS_CACHE_TTL,
            async move {
                let providers: TmdbWatchProviders = self
                    .fetch_json(&format!("/movie/{}/watch/providers", movie_id), &[])
                    .await?;

                // Upstream returns every region at once; callers want one.
                let offers = providers
                    .results
                    .get(&region.to_uppercase())
                    .cloned()
                    .unwrap_or_default();

                Ok::<_, AppError>(offers)
            }
        )
    }
}
