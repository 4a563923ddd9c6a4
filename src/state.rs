use std::sync::Arc;

use crate::{
    db::{SeenSetStore, WatchlistStore},
    services::{
        availability::AvailabilityService, feed::FeedService, recommendations::Recommender,
        signals::SignalDispatcher, source::MovieSource,
    },
};

/// Shared application state
///
/// Every seam is an `Arc`'d trait object so tests can inject in-memory or
/// mock implementations; nothing here is a process-wide singleton.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn MovieSource>,
    pub feed: Arc<FeedService>,
    pub availability: Arc<AvailabilityService>,
    pub recommender: Arc<dyn Recommender>,
    pub seen: Arc<dyn SeenSetStore>,
    pub watchlist: Arc<dyn WatchlistStore>,
    pub signals: SignalDispatcher,
    pub default_region: String,
}
