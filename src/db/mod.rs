pub mod postgres;
pub mod redis;
pub mod seen;
pub mod signals;
pub mod watchlist;

pub use postgres::create_pool;
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
pub use seen::{InMemorySeenStore, RedisSeenStore, SeenSetStore};
pub use signals::{PgSignalStore, SignalStore};
pub use watchlist::{PgWatchlistStore, WatchlistStore};
