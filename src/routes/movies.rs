use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::{Movie, MovieAvailability, MovieDetails},
    services::feed::sort_by_popularity,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    region: Option<String>,
}

/// Handler for movie title search. Results are ordered by popularity,
/// unlike the shuffled feed.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let mut movies = state.source.search_movies(&params.q).await?;
    sort_by_popularity(&mut movies);
    Ok(Json(movies))
}

/// Handler for movie details
pub async fn details(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<MovieDetails>> {
    let details = state.source.movie_details(movie_id).await?;
    Ok(Json(details))
}

/// Handler for streaming availability
pub async fn availability(
    State(state): State<AppState>,
    Path(movie_id): Path<i64>,
    Query(params): Query<RegionQuery>,
) -> AppResult<Json<MovieAvailability>> {
    let region = params
        .region
        .unwrap_or_else(|| state.default_region.clone());
    let availability = state.availability.availability(movie_id, &region).await?;
    Ok(Json(availability))
}
