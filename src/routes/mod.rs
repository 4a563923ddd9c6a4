use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::state::AppState;

pub mod feed;
pub mod movies;
pub mod recommendations;
pub mod seen;
pub mod signals;
pub mod watchlist;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes(state))
}

/// API routes under /api/v1
fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/feed", get(feed::get_feed))
        .route("/movies/search", get(movies::search))
        .route("/movies/:id", get(movies::details))
        .route("/movies/:id/availability", get(movies::availability))
        .route("/recommendations/:user_id", get(recommendations::recommend))
        .route("/signals", post(signals::record))
        .route("/watchlist", post(watchlist::add))
        .route("/watchlist/:user_id", get(watchlist::list))
        .route("/watchlist/:user_id/:movie_id", delete(watchlist::remove))
        .route("/seen/:user_id", get(seen::list).delete(seen::clear))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
