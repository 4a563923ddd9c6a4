use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::models::WatchlistEntry;

/// Persistence for user watchlists.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Adds an entry; re-adding the same movie refreshes title and poster.
    async fn add(&self, entry: &WatchlistEntry) -> AppResult<()>;

    /// All entries for a user, newest first.
    async fn list(&self, user_id: &str) -> AppResult<Vec<WatchlistEntry>>;

    /// Removes one entry; `NotFound` if the movie is not on the list.
    async fn remove(&self, user_id: &str, movie_id: i64) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgWatchlistStore {
    pool: PgPool,
}

impl PgWatchlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl WatchlistStore for PgWatchlistStore {
    async fn add(&self, entry: &WatchlistEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO watchlist (user_id, movie_id, movie_title, movie_poster, added_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, movie_id)
            DO UPDATE SET movie_title = EXCLUDED.movie_title,
                          movie_poster = EXCLUDED.movie_poster
            "#,
        )
        .bind(&entry.user_id)
        .bind(entry.movie_id)
        .bind(&entry.movie_title)
        .bind(&entry.movie_poster)
        .bind(entry.added_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, user_id: &str) -> AppResult<Vec<WatchlistEntry>> {
        let entries = sqlx::query_as::<_, WatchlistEntry>(
            r#"
            SELECT user_id, movie_id, movie_title, movie_poster, added_at
            FROM watchlist
            WHERE user_id = $1
            ORDER BY added_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn remove(&self, user_id: &str, movie_id: i64) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM watchlist
            WHERE user_id = $1 AND movie_id = $2
            "#,
        )
        .bind(user_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Movie {} is not on the watchlist",
                movie_id
            )));
        }

        Ok(())
    }
}
