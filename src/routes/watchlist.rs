use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::WatchlistEntry,
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWatchlistRequest {
    pub user_id: String,
    pub movie_id: i64,
    pub movie_title: String,
    pub movie_poster: Option<String>,
}

/// Handler for adding a movie to the watchlist
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddWatchlistRequest>,
) -> AppResult<(StatusCode, Json<WatchlistEntry>)> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::InvalidInput("userId cannot be empty".to_string()));
    }

    let entry = WatchlistEntry {
        user_id: request.user_id,
        movie_id: request.movie_id,
        movie_title: request.movie_title,
        movie_poster: request.movie_poster,
        added_at: Utc::now(),
    };

    state.watchlist.add(&entry).await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Handler for listing a user's watchlist
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<WatchlistEntry>>> {
    let entries = state.watchlist.list(&user_id).await?;
    Ok(Json(entries))
}

/// Handler for removing a movie from the watchlist
pub async fn remove(
    State(state): State<AppState>,
    Path((user_id, movie_id)): Path<(String, i64)>,
) -> AppResult<StatusCode> {
    state.watchlist.remove(&user_id, movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
