use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;

use crate::{
    db::SeenSetStore,
    error::AppResult,
    models::{FeedRequest, Movie},
    services::{recommendations::Recommender, source::MovieSource},
};

/// Upstream caps list endpoints at 500 pages.
const MAX_PAGE: u32 = 500;
const DEFAULT_FEED_LIMIT: usize = 20;

/// Hashes a request salt into an upstream page number in `[1, 500]`.
///
/// `hash = (hash * 31 + char) mod 2^32`, unsigned. Same salt, same page;
/// the randomness lives in the salt itself (clients build it from wall-clock
/// time plus a random integer). The empty salt hashes to page 1. Spreads
/// repeated requests across upstream pages; no unpredictability guarantees.
pub fn sample_page(salt: &str) -> u32 {
    let mut hash: u32 = 0;
    for c in salt.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(c as u32);
    }
    (hash % MAX_PAGE) + 1
}

/// Drops movies whose id is in the exclude set or that lack a usable
/// poster. Order-preserving; never sorts, never fails.
pub fn filter_unseen(movies: Vec<Movie>, exclude: &HashSet<i64>) -> Vec<Movie> {
    movies
        .into_iter()
        .filter(|movie| movie.has_usable_poster() && !exclude.contains(&movie.id))
        .collect()
}

/// Uniform in-place permutation with a guard against repeating the previous
/// feed's lead card across consecutive refreshes.
///
/// The guard is a UX tie-break: when the fresh shuffle happens to land the
/// previous lead back on top, positions 0 and 1 are swapped.
pub fn shuffle_cards<R: Rng>(movies: &mut [Movie], previous_first_id: Option<i64>, rng: &mut R) {
    for i in (1..movies.len()).rev() {
        let j = rng.gen_range(0..=i);
        movies.swap(i, j);
    }

    if movies.len() > 1 && previous_first_id == Some(movies[0].id) {
        movies.swap(0, 1);
    }
}

/// Popularity ordering used by the search path. The feed path shuffles
/// instead; the two orders are deliberately separate operations and the
/// filter itself never sorts.
pub fn sort_by_popularity(movies: &mut [Movie]) {
    movies.sort_by(|a, b| {
        b.popularity
            .unwrap_or(0.0)
            .partial_cmp(&a.popularity.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Assembles discovery feeds: personalized recommendations when the user
/// has enough history, otherwise a pseudo-randomly sampled popular page,
/// both de-duplicated against the seen set and shuffled.
pub struct FeedService {
    source: Arc<dyn MovieSource>,
    recommender: Arc<dyn Recommender>,
    seen: Arc<dyn SeenSetStore>,
    default_region: String,
}

impl FeedService {
    pub fn new(
        source: Arc<dyn MovieSource>,
        recommender: Arc<dyn Recommender>,
        seen: Arc<dyn SeenSetStore>,
        default_region: String,
    ) -> Self {
        Self {
            source,
            recommender,
            seen,
            default_region,
        }
    }

    /// Assembles one feed.
    ///
    /// The personalized path is attempted at most once; any failure there
    /// (network, upstream status, insufficient history) falls back to the
    /// popular path. A popular-path failure propagates to the caller — there
    /// is no further fallback.
    pub async fn assemble_feed(&self, request: &FeedRequest) -> AppResult<Vec<Movie>> {
        let region = request.region.as_deref().unwrap_or(&self.default_region);
        let limit = request.limit.unwrap_or(DEFAULT_FEED_LIMIT);

        let mut exclude: HashSet<i64> = request.exclude_ids.iter().copied().collect();
        if let Some(user_id) = request.user_id.as_deref() {
            exclude.extend(self.seen.load(user_id).await);
        }

        let movies = match request.user_id.as_deref() {
            Some(user_id) => {
                match self
                    .recommender
                    .recommend(user_id, region, limit, &exclude)
                    .await
                {
                    Ok(movies) if !movies.is_empty() => movies,
                    Ok(_) => {
                        tracing::debug!(
                            user_id = %user_id,
                            "Personalized path returned nothing, falling back to popular"
                        );
                        self.popular_page(request, region).await?
                    }
                    Err(e) => {
                        tracing::warn!(
                            user_id = %user_id,
                            error = %e,
                            "Personalized path failed, falling back to popular"
                        );
                        self.popular_page(request, region).await?
                    }
                }
            }
            None => self.popular_page(request, region).await?,
        };

        let mut feed = filter_unseen(movies, &exclude);
        shuffle_cards(&mut feed, request.previous_first_id, &mut rand::thread_rng());
        feed.truncate(limit);

        tracing::info!(
            cards = feed.len(),
            region = %region,
            personalized = request.user_id.is_some(),
            "Feed assembled"
        );

        Ok(feed)
    }

    async fn popular_page(&self, request: &FeedRequest, region: &str) -> AppResult<Vec<Movie>> {
        let page = match request.page {
            Some(page) => page.clamp(1, MAX_PAGE),
            None if request.randomize => sample_page(request.salt.as_deref().unwrap_or("")),
            None => 1,
        };

        self.source.popular_movies(page, region).await
    }
}
