use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reeldeck_api::{
    config::Config,
    db::{
        self, Cache, PgSignalStore, PgWatchlistStore, RedisSeenStore, SeenSetStore, SignalStore,
        WatchlistStore,
    },
    middleware::{make_span_with_request_id, request_id_middleware},
    routes::create_router,
    services::{
        availability::AvailabilityService,
        feed::FeedService,
        recommendations::{Recommender, SignalRecommender},
        signals::SignalDispatcher,
        source::{MovieSource, TmdbSource},
    },
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing TMDB credential is a configuration error; fail startup
    // before anything binds.
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reeldeck_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = db::create_pool(&config.database_url).await?;
    db::postgres::run_migrations(&pool).await?;

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client.clone()).await;

    let source: Arc<dyn MovieSource> = Arc::new(TmdbSource::new(
        cache,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    )?);
    let seen: Arc<dyn SeenSetStore> = Arc::new(RedisSeenStore::new(redis_client));
    let signal_store: Arc<dyn SignalStore> = Arc::new(PgSignalStore::new(pool.clone()));
    let watchlist: Arc<dyn WatchlistStore> = Arc::new(PgWatchlistStore::new(pool));

    let recommender: Arc<dyn Recommender> = Arc::new(SignalRecommender::new(
        Arc::clone(&source),
        Arc::clone(&signal_store),
    ));
    let (dispatcher, signal_writer) = SignalDispatcher::new(signal_store, Arc::clone(&seen));

    let state = AppState {
        feed: Arc::new(FeedService::new(
            Arc::clone(&source),
            Arc::clone(&recommender),
            Arc::clone(&seen),
            config.default_region.clone(),
        )),
        availability: Arc::new(AvailabilityService::new(Arc::clone(&source))),
        source,
        recommender,
        seen,
        watchlist,
        signals: dispatcher,
        default_region: config.default_region.clone(),
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Flush pending background writes before exiting.
    signal_writer.shutdown().await;
    cache_writer.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install shutdown handler");
    }
}
