use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{error::AppResult, state::AppState};

/// Handler for reading a user's seen-set
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<i64>>> {
    let mut ids: Vec<i64> = state.seen.load(&user_id).await.into_iter().collect();
    ids.sort_unstable();
    Ok(Json(ids))
}

/// Handler for clearing a user's seen-set, resetting every card to unseen
pub async fn clear(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<StatusCode> {
    state.seen.clear(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
