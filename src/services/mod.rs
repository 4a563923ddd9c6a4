pub mod availability;
pub mod feed;
pub mod recommendations;
pub mod signals;
pub mod source;

pub use availability::AvailabilityService;
pub use feed::FeedService;
pub use recommendations::{Recommender, SignalRecommender};
pub use signals::{SignalDispatcher, SignalWriterHandle};
pub use source::{MovieSource, TmdbSource};
