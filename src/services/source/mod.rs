/// Upstream movie-data source abstraction
///
/// The feed, recommendation, and availability services all consume movie
/// data through this trait so the upstream API can be swapped or mocked.
/// The production implementation proxies TMDB.
use crate::{
    error::AppResult,
    models::{Movie, MovieDetails, TmdbRegionOffers},
};

pub mod tmdb;

pub use tmdb::TmdbSource;

/// Trait for upstream movie-metadata sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieSource: Send + Sync {
    /// Search for movies by title.
    async fn search_movies(&self, query: &str) -> AppResult<Vec<Movie>>;

    /// One page of the popularity ranking for a region. Pages are 1-based
    /// and bounded upstream at 500.
    async fn popular_movies(&self, page: u32, region: &str) -> AppResult<Vec<Movie>>;

    /// One page of the discovery listing restricted to the given genres,
    /// most popular first.
    async fn discover_by_genres(
        &self,
        genre_ids: &[i64],
        page: u32,
        region: &str,
    ) -> AppResult<Vec<Movie>>;

    /// Full details for a single movie.
    async fn movie_details(&self, movie_id: i64) -> AppResult<MovieDetails>;

    /// Raw streaming offers for a movie in a region. An empty bucket set is
    /// returned when the region has no offers.
    async fn watch_providers(&self, movie_id: i64, region: &str) -> AppResult<TmdbRegionOffers>;
}
