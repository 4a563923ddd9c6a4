use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    db::SignalStore,
    error::{AppError, AppResult},
    models::Movie,
    services::source::MovieSource,
};

/// Users need this many positive signals before personalization kicks in.
const MIN_SIGNAL_COUNT: i64 = 3;
/// How many recent positive movies feed the taste derivation.
const TASTE_SAMPLE_SIZE: i64 = 10;
const TOP_GENRE_COUNT: usize = 3;

/// Personalized recommendation source.
///
/// The feed falls back to the popular path whenever this fails, so every
/// error here (including insufficient history) is recoverable upstream.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Recommender: Send + Sync {
    /// Recommendations for a user, excluding the given ids, at most `limit`.
    ///
    /// Returns `InsufficientSignals` when the user's history is too thin.
    async fn recommend(
        &self,
        user_id: &str,
        region: &str,
        limit: usize,
        exclude: &HashSet<i64>,
    ) -> AppResult<Vec<Movie>>;
}

/// Derives taste from recorded like/watchlist signals: tally the genres of
/// recently signaled movies, then query the discovery listing with the top
/// genres.
pub struct SignalRecommender {
    source: Arc<dyn MovieSource>,
    signals: Arc<dyn SignalStore>,
}

impl SignalRecommender {
    pub fn new(source: Arc<dyn MovieSource>, signals: Arc<dyn SignalStore>) -> Self {
        Self { source, signals }
    }
}

#[async_trait::async_trait]
impl Recommender for SignalRecommender {
    async fn recommend(
        &self,
        user_id: &str,
        region: &str,
        limit: usize,
        exclude: &HashSet<i64>,
    ) -> AppResult<Vec<Movie>> {
        let signal_count = self.signals.positive_signal_count(user_id).await?;
        if signal_count < MIN_SIGNAL_COUNT {
            return Err(AppError::InsufficientSignals(user_id.to_string()));
        }

        let recent = self
            .signals
            .recent_positive_movie_ids(user_id, TASTE_SAMPLE_SIZE)
            .await?;

        // Fetch details in parallel; a partial failure only thins the tally.
        let mut tasks = Vec::new();
        for movie_id in recent {
            let source = Arc::clone(&self.source);
            tasks.push(tokio::spawn(
                async move { source.movie_details(movie_id).await },
            ));
        }

        let mut genre_lists = Vec::new();
        for task in tasks {
            match task.await {
                Ok(Ok(details)) => genre_lists.push(details.genre_ids()),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "Detail fetch failed during taste derivation")
                }
                Err(e) => tracing::warn!(error = %e, "Detail task join error"),
            }
        }

        let genres = top_genres(&genre_lists, TOP_GENRE_COUNT);
        if genres.is_empty() {
            // Signals exist but none of the movies resolved to genres.
            return Err(AppError::InsufficientSignals(user_id.to_string()));
        }

        let movies = self.source.discover_by_genres(&genres, 1, region).await?;

        let recommendations: Vec<Movie> = movies
            .into_iter()
            .filter(|movie| !exclude.contains(&movie.id))
            .take(limit)
            .collect();

        tracing::info!(
            user_id = %user_id,
            signals = signal_count,
            genres = ?genres,
            results = recommendations.len(),
            "Personalized recommendations assembled"
        );

        Ok(recommendations)
    }
}

/// Tallies genre ids across the sampled movies and returns the most common
/// ones, ties broken toward the lower genre id for stability.
pub fn top_genres(genre_lists: &[Vec<i64>], count: usize) -> Vec<i64> {
    let mut tallies: HashMap<i64, usize> = HashMap::new();
    for list in genre_lists {
        for &genre in list {
            *tallies.entry(genre).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(i64, usize)> = tallies.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(count)
        .map(|(genre, _)| genre)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::signals::MockSignalStore;
    use crate::models::{Genre, MovieDetails};
    use crate::services::source::MockMovieSource;

    fn details_with_genres(id: i64, genre_ids: &[i64]) -> MovieDetails {
        MovieDetails {
            id,
            title: format!("Movie {}", id),
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            popularity: None,
            vote_average: None,
            vote_count: None,
            runtime_minutes: None,
            genres: genre_ids
                .iter()
                .map(|&gid| Genre {
                    id: gid,
                    name: format!("Genre {}", gid),
                })
                .collect(),
            imdb_id: None,
        }
    }

    fn movie(id: i64) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            overview: None,
            poster_path: Some("/p.jpg".to_string()),
            backdrop_path: None,
            release_date: None,
            popularity: None,
            vote_average: None,
            vote_count: None,
            genre_ids: None,
        }
    }

    #[test]
    fn test_top_genres_orders_by_frequency() {
        let lists = vec![vec![28, 878], vec![28, 12], vec![28, 878]];
        assert_eq!(top_genres(&lists, 3), vec![28, 878, 12]);
    }

    #[test]
    fn test_top_genres_breaks_ties_by_id() {
        let lists = vec![vec![53, 18]];
        assert_eq!(top_genres(&lists, 2), vec![18, 53]);
    }

    #[test]
    fn test_top_genres_truncates() {
        let lists = vec![vec![1, 2, 3, 4]];
        assert_eq!(top_genres(&lists, 2).len(), 2);
    }

    #[test]
    fn test_top_genres_empty_input() {
        assert!(top_genres(&[], 3).is_empty());
    }

    #[tokio::test]
    async fn test_recommend_rejects_thin_history() {
        let mut signals = MockSignalStore::new();
        signals
            .expect_positive_signal_count()
            .times(1)
            .returning(|_| Ok(2));

        // The upstream source must never be queried for a thin history.
        let source = MockMovieSource::new();

        let recommender = SignalRecommender::new(Arc::new(source), Arc::new(signals));
        let result = recommender
            .recommend("user-1", "US", 20, &HashSet::new())
            .await;

        assert!(matches!(result, Err(AppError::InsufficientSignals(_))));
    }

    #[tokio::test]
    async fn test_recommend_discovers_by_top_genres() {
        let mut signals = MockSignalStore::new();
        signals.expect_positive_signal_count().returning(|_| Ok(3));
        signals
            .expect_recent_positive_movie_ids()
            .returning(|_, _| Ok(vec![100, 101]));

        let mut source = MockMovieSource::new();
        source
            .expect_movie_details()
            .returning(|id| Ok(details_with_genres(id, &[28, 878])));
        source
            .expect_discover_by_genres()
            .withf(|genres, page, region| genres == [28, 878] && *page == 1 && region == "US")
            .times(1)
            .returning(|_, _, _| Ok(vec![movie(1), movie(2), movie(3)]));

        let recommender = SignalRecommender::new(Arc::new(source), Arc::new(signals));
        let result = recommender
            .recommend("user-1", "US", 20, &HashSet::new())
            .await
            .unwrap();

        assert_eq!(
            result.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn test_recommend_excludes_seen_and_limits() {
        let mut signals = MockSignalStore::new();
        signals.expect_positive_signal_count().returning(|_| Ok(5));
        signals
            .expect_recent_positive_movie_ids()
            .returning(|_, _| Ok(vec![100]));

        let mut source = MockMovieSource::new();
        source
            .expect_movie_details()
            .returning(|id| Ok(details_with_genres(id, &[35])));
        source
            .expect_discover_by_genres()
            .returning(|_, _, _| Ok(vec![movie(1), movie(2), movie(3), movie(4)]));

        let exclude: HashSet<i64> = [2].into_iter().collect();
        let recommender = SignalRecommender::new(Arc::new(source), Arc::new(signals));
        let result = recommender
            .recommend("user-1", "US", 2, &exclude)
            .await
            .unwrap();

        assert_eq!(result.iter().map(|m| m.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_recommend_tolerates_detail_fetch_failures() {
        let mut signals = MockSignalStore::new();
        signals.expect_positive_signal_count().returning(|_| Ok(3));
        signals
            .expect_recent_positive_movie_ids()
            .returning(|_, _| Ok(vec![100, 101]));

        let mut source = MockMovieSource::new();
        source.expect_movie_details().returning(|id| {
            if id == 100 {
                Err(AppError::ExternalApi("flaky upstream".to_string()))
            } else {
                Ok(details_with_genres(id, &[18]))
            }
        });
        source
            .expect_discover_by_genres()
            .withf(|genres, _, _| genres == [18])
            .times(1)
            .returning(|_, _, _| Ok(vec![movie(9)]));

        let recommender = SignalRecommender::new(Arc::new(source), Arc::new(signals));
        let result = recommender
            .recommend("user-1", "US", 20, &HashSet::new())
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
    }
}
