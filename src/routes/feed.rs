use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{FeedRequest, Movie},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub user_id: Option<String>,
    #[serde(default)]
    pub randomize: bool,
    pub salt: Option<String>,
    pub page: Option<u32>,
    /// Comma-separated movie ids to exclude on top of the seen set.
    pub exclude_ids: Option<String>,
    pub previous_first_id: Option<i64>,
    pub region: Option<String>,
    pub limit: Option<usize>,
    /// Opaque client token, echoed back unchanged.
    pub request_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub movies: Vec<Movie>,
    /// Echoed so clients can discard responses superseded by a newer
    /// request.
    pub request_token: Option<String>,
}

/// Handler for the discovery feed endpoint
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<Json<FeedResponse>> {
    let request = FeedRequest {
        user_id: query.user_id,
        randomize: query.randomize,
        salt: query.salt,
        page: query.page,
        exclude_ids: parse_id_list(query.exclude_ids.as_deref()),
        previous_first_id: query.previous_first_id,
        region: query.region,
        limit: query.limit,
    };

    let movies = state.feed.assemble_feed(&request).await?;

    Ok(Json(FeedResponse {
        movies,
        request_token: query.request_token,
    }))
}

/// Parses a comma-separated id list, dropping anything non-numeric.
/// Malformed entries are excluded, never an error.
fn parse_id_list(raw: Option<&str>) -> Vec<i64> {
    raw.unwrap_or_default()
        .split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}
