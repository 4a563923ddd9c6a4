use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{error::AppResult, models::Movie, state::AppState};

const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    region: Option<String>,
    limit: Option<usize>,
}

/// Handler for personalized recommendations.
///
/// Users with fewer than the minimum signal count get `204 No Content`
/// (via `AppError::InsufficientSignals`), which clients treat as "use the
/// popular feed instead".
pub async fn recommend(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<Vec<Movie>>> {
    let region = params
        .region
        .unwrap_or_else(|| state.default_region.clone());
    let exclude = state.seen.load(&user_id).await;

    let movies = state
        .recommender
        .recommend(
            &user_id,
            &region,
            params.limit.unwrap_or(DEFAULT_LIMIT),
            &exclude,
        )
        .await?;

    Ok(Json(movies))
}
