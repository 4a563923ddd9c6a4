use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A movie saved to a user's watchlist.
///
/// Title and poster are denormalized at save time so the list renders
/// without refetching upstream metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub user_id: String,
    pub movie_id: i64,
    pub movie_title: String,
    pub movie_poster: Option<String>,
    pub added_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = WatchlistEntry {
            user_id: "user-1".to_string(),
            movie_id: 27205,
            movie_title: "Inception".to_string(),
            movie_poster: Some("/inception.jpg".to_string()),
            added_at: Utc::now(),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["movieTitle"], "Inception");
        assert_eq!(json["moviePoster"], "/inception.jpg");
    }
}
