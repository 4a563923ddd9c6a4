use sqlx::{PgPool, Row};

use crate::error::AppResult;
use crate::models::Signal;

/// Persistence for user preference signals.
///
/// One row per `(user, movie, action)`; replaying a signal refreshes its
/// timestamp instead of inserting a duplicate.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SignalStore: Send + Sync {
    /// Upserts one signal.
    async fn record(&self, signal: &Signal) -> AppResult<()>;

    /// Number of positive (like/watchlist) signals recorded for the user.
    async fn positive_signal_count(&self, user_id: &str) -> AppResult<i64>;

    /// Most recently signaled positive movie ids, newest first, deduplicated
    /// across actions.
    async fn recent_positive_movie_ids(&self, user_id: &str, limit: i64) -> AppResult<Vec<i64>>;
}

#[derive(Clone)]
pub struct PgSignalStore {
    pool: PgPool,
}

impl PgSignalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SignalStore for PgSignalStore {
    async fn record(&self, signal: &Signal) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO signals (user_id, movie_id, action, recorded_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, movie_id, action)
            DO UPDATE SET recorded_at = EXCLUDED.recorded_at
            "#,
        )
        .bind(&signal.user_id)
        .bind(signal.movie_id)
        .bind(signal.action.as_str())
        .bind(signal.recorded_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            user_id = %signal.user_id,
            movie_id = signal.movie_id,
            action = signal.action.as_str(),
            "Signal recorded"
        );

        Ok(())
    }

    async fn positive_signal_count(&self, user_id: &str) -> AppResult<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM signals
            WHERE user_id = $1 AND action IN ('like', 'watchlist')
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get::<i64, _>("count"))
    }

    async fn recent_positive_movie_ids(&self, user_id: &str, limit: i64) -> AppResult<Vec<i64>> {
        let rows = sqlx::query(
            r#"
            SELECT movie_id
            FROM signals
            WHERE user_id = $1 AND action IN ('like', 'watchlist')
            GROUP BY movie_id
            ORDER BY MAX(recorded_at) DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<i64, _>("movie_id"))
            .collect())
    }
}
