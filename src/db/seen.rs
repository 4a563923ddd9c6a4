use std::collections::{HashMap, HashSet};

use redis::AsyncCommands;
use tokio::sync::RwLock;

use crate::error::AppResult;

/// Persisted set of movie ids a user has already been shown.
///
/// The set only grows during a session; there is no per-id removal, only a
/// full clear. Feed assembly filters against it and signal recording adds
/// to it, so an id that entered the set never resurfaces until the user
/// explicitly resets.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SeenSetStore: Send + Sync {
    /// Hydrates the set for a user. Absent or corrupt persisted data is
    /// treated as "no prior state" and yields an empty set.
    async fn load(&self, user_id: &str) -> HashSet<i64>;

    /// Inserts one id and persists the updated set. Idempotent.
    async fn add(&self, user_id: &str, movie_id: i64) -> AppResult<()>;

    /// Pure lookup against the hydrated set.
    async fn contains(&self, user_id: &str, movie_id: i64) -> bool {
        self.load(user_id).await.contains(&movie_id)
    }

    /// Empties the set and persists.
    async fn clear(&self, user_id: &str) -> AppResult<()>;
}

/// Redis-backed store. The set is kept as a JSON id array under the fixed
/// key `seen:{user_id}`, with no expiry.
#[derive(Clone)]
pub struct RedisSeenStore {
    redis_client: redis::Client,
}

impl RedisSeenStore {
    pub fn new(redis_client: redis::Client) -> Self {
        Self { redis_client }
    }

    fn key(user_id: &str) -> String {
        format!("seen:{}", user_id)
    }

    async fn persist(&self, user_id: &str, seen: &HashSet<i64>) -> AppResult<()> {
        let mut ids: Vec<i64> = seen.iter().copied().collect();
        ids.sort_unstable();

        let json = serde_json::to_string(&ids)
            .map_err(|e| crate::error::AppError::Internal(format!("Seen-set encoding: {}", e)))?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(Self::key(user_id), json).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SeenSetStore for RedisSeenStore {
    async fn load(&self, user_id: &str) -> HashSet<i64> {
        let mut conn = match self.redis_client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Seen-set load failed, using empty set");
                return HashSet::new();
            }
        };

        let raw: Option<String> = match conn.get(Self::key(user_id)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, user_id = %user_id, "Seen-set read failed, using empty set");
                return HashSet::new();
            }
        };

        match raw {
            Some(json) => match serde_json::from_str::<Vec<i64>>(&json) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    // Corrupt persisted state is "no prior state", never fatal.
                    tracing::warn!(error = %e, user_id = %user_id, "Corrupt seen-set payload, resetting to empty");
                    HashSet::new()
                }
            },
            None => HashSet::new(),
        }
    }

    async fn add(&self, user_id: &str, movie_id: i64) -> AppResult<()> {
        let mut seen = self.load(user_id).await;
        if seen.insert(movie_id) {
            self.persist(user_id, &seen).await?;
        }
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> AppResult<()> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(Self::key(user_id)).await?;
        tracing::info!(user_id = %user_id, "Seen set cleared");
        Ok(())
    }
}

/// Process-local store for tests and single-instance runs.
#[derive(Default)]
pub struct InMemorySeenStore {
    sets: RwLock<HashMap<String, HashSet<i64>>>,
}

impl InMemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SeenSetStore for InMemorySeenStore {
    async fn load(&self, user_id: &str) -> HashSet<i64> {
        self.sets
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn add(&self, user_id: &str, movie_id: i64) -> AppResult<()> {
        self.sets
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .insert(movie_id);
        Ok(())
    }

    async fn clear(&self, user_id: &str) -> AppResult<()> {
        self.sets.write().await.remove(user_id);
        Ok(())
    }
}
