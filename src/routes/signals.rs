use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Signal, SignalAction},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSignalRequest {
    pub user_id: String,
    pub movie_id: i64,
    pub action: SignalAction,
    /// Client-side timestamp; server time is used when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Handler for signal recording.
///
/// Fire-and-forget: the signal is enqueued for the background writer and
/// the request is acknowledged immediately. A lost write never blocks card
/// advancement.
pub async fn record(
    State(state): State<AppState>,
    Json(request): Json<RecordSignalRequest>,
) -> AppResult<StatusCode> {
    if request.user_id.trim().is_empty() {
        return Err(AppError::InvalidInput("userId cannot be empty".to_string()));
    }

    state.signals.dispatch(Signal {
        user_id: request.user_id,
        movie_id: request.movie_id,
        action: request.action,
        recorded_at: request.timestamp.unwrap_or_else(Utc::now),
    });

    Ok(StatusCode::ACCEPTED)
}
