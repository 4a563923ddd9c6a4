use serde::{Deserialize, Serialize};

mod platform;
mod signal;
mod watchlist;

pub use platform::{OfferType, Platform};
pub use signal::{Signal, SignalAction};
pub use watchlist::WatchlistEntry;

/// A movie as served to clients.
///
/// Field names are camelCase on the wire; the upstream API speaks snake_case
/// and is mapped through [`TmdbMovie`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub genre_ids: Option<Vec<i64>>,
}

impl Movie {
    /// Whether the movie has a poster the client can actually render.
    ///
    /// Upstream occasionally returns an empty string or the literal string
    /// "null" instead of omitting the field.
    pub fn has_usable_poster(&self) -> bool {
        match self.poster_path.as_deref() {
            Some(path) => !path.is_empty() && path != "null",
            None => false,
        }
    }
}

/// Detailed movie info served to clients, with genres resolved to names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub popularity: Option<f64>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i64>,
    pub runtime_minutes: Option<i32>,
    pub genres: Vec<Genre>,
    pub imdb_id: Option<String>,
}

impl MovieDetails {
    /// Genre ids of this movie, in upstream order.
    pub fn genre_ids(&self) -> Vec<i64> {
        self.genres.iter().map(|g| g.id).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

// ============================================================================
// Upstream (TMDB) API Types
// ============================================================================

/// A single movie entry as returned by upstream list endpoints
/// (search, popular, discover).
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub genre_ids: Option<Vec<i64>>,
}

impl From<TmdbMovie> for Movie {
    fn from(movie: TmdbMovie) -> Self {
        Movie {
            id: movie.id,
            title: movie.title,
            overview: movie.overview,
            poster_path: movie.poster_path,
            backdrop_path: movie.backdrop_path,
            release_date: movie.release_date,
            popularity: movie.popularity,
            vote_average: movie.vote_average,
            vote_count: movie.vote_count,
            genre_ids: movie.genre_ids,
        }
    }
}

/// A paginated upstream list response.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

/// Upstream movie details response (`/movie/{id}`).
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: Option<i64>,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
    #[serde(default)]
    pub imdb_id: Option<String>,
}

impl From<TmdbMovieDetails> for MovieDetails {
    fn from(details: TmdbMovieDetails) -> Self {
        MovieDetails {
            id: details.id,
            title: details.title,
            overview: details.overview,
            poster_path: details.poster_path,
            backdrop_path: details.backdrop_path,
            release_date: details.release_date,
            popularity: details.popularity,
            vote_average: details.vote_average,
            vote_count: details.vote_count,
            runtime_minutes: details.runtime,
            genres: details.genres.unwrap_or_default(),
            imdb_id: details.imdb_id,
        }
    }
}

/// Upstream watch-providers response (`/movie/{id}/watch/providers`).
///
/// Offers are grouped per region, then bucketed by offer type.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbWatchProviders {
    pub id: i64,
    #[serde(default)]
    pub results: std::collections::HashMap<String, TmdbRegionOffers>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbRegionOffers {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Option<Vec<TmdbProviderRef>>,
    #[serde(default)]
    pub rent: Option<Vec<TmdbProviderRef>>,
    #[serde(default)]
    pub buy: Option<Vec<TmdbProviderRef>>,
    #[serde(default)]
    pub free: Option<Vec<TmdbProviderRef>>,
    #[serde(default)]
    pub ads: Option<Vec<TmdbProviderRef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbProviderRef {
    pub provider_id: i64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

// ============================================================================
// Feed Types
// ============================================================================

/// Parameters for one feed assembly. Ephemeral; never persisted.
#[derive(Debug, Clone, Default)]
pub struct FeedRequest {
    /// Absent for anonymous sessions; skips the personalized path.
    pub user_id: Option<String>,
    pub randomize: bool,
    /// Client-supplied randomness (timestamp + random integer) hashed into
    /// an upstream page number.
    pub salt: Option<String>,
    /// Explicit upstream page, overriding the sampler.
    pub page: Option<u32>,
    /// Ids to exclude on top of the persisted seen set.
    pub exclude_ids: Vec<i64>,
    /// Lead card of the previous feed, tracked by the client.
    pub previous_first_id: Option<i64>,
    pub region: Option<String>,
    pub limit: Option<usize>,
}

/// Streaming availability for one movie in one region, reshaped from the
/// upstream watch-providers payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieAvailability {
    pub movie_id: i64,
    pub region: String,
    pub offers: Vec<StreamingOffer>,
    pub cached_at: chrono::DateTime<chrono::Utc>,
}

/// One place a movie can be watched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StreamingOffer {
    pub platform: Platform,
    pub provider_name: String,
    pub offer_type: OfferType,
    pub watch_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmdb_movie_to_movie_maps_all_fields() {
        let tmdb = TmdbMovie {
            id: 27205,
            title: "Inception".to_string(),
            overview: Some("A thief who steals corporate secrets".to_string()),
            poster_path: Some("/inception.jpg".to_string()),
            backdrop_path: Some("/inception_backdrop.jpg".to_string()),
            release_date: Some("2010-07-15".to_string()),
            popularity: Some(83.5),
            vote_average: Some(8.4),
            vote_count: Some(34000),
            genre_ids: Some(vec![28, 878]),
        };

        let movie: Movie = tmdb.into();
        assert_eq!(movie.id, 27205);
        assert_eq!(movie.title, "Inception");
        assert_eq!(movie.poster_path, Some("/inception.jpg".to_string()));
        assert_eq!(movie.genre_ids, Some(vec![28, 878]));
    }

    #[test]
    fn test_tmdb_movie_missing_fields_default_to_none() {
        let json = r#"{ "id": 603, "title": "The Matrix" }"#;
        let tmdb: TmdbMovie = serde_json::from_str(json).unwrap();

        assert_eq!(tmdb.id, 603);
        assert_eq!(tmdb.overview, None);
        assert_eq!(tmdb.poster_path, None);
        assert_eq!(tmdb.genre_ids, None);
    }

    #[test]
    fn test_movie_serializes_camel_case() {
        let movie = Movie {
            id: 603,
            title: "The Matrix".to_string(),
            overview: None,
            poster_path: Some("/matrix.jpg".to_string()),
            backdrop_path: None,
            release_date: Some("1999-03-30".to_string()),
            popularity: None,
            vote_average: Some(8.2),
            vote_count: None,
            genre_ids: Some(vec![28]),
        };

        let json = serde_json::to_value(&movie).unwrap();
        assert_eq!(json["posterPath"], "/matrix.jpg");
        assert_eq!(json["releaseDate"], "1999-03-30");
        assert_eq!(json["voteAverage"], 8.2);
        assert!(json.get("poster_path").is_none());
    }

    #[test]
    fn test_has_usable_poster() {
        let mut movie = Movie {
            id: 1,
            title: "Test".to_string(),
            overview: None,
            poster_path: Some("/poster.jpg".to_string()),
            backdrop_path: None,
            release_date: None,
            popularity: None,
            vote_average: None,
            vote_count: None,
            genre_ids: None,
        };
        assert!(movie.has_usable_poster());

        movie.poster_path = Some(String::new());
        assert!(!movie.has_usable_poster());

        movie.poster_path = Some("null".to_string());
        assert!(!movie.has_usable_poster());

        movie.poster_path = None;
        assert!(!movie.has_usable_poster());
    }

    #[test]
    fn test_details_genre_ids() {
        let details = MovieDetails {
            id: 27205,
            title: "Inception".to_string(),
            overview: None,
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            popularity: None,
            vote_average: None,
            vote_count: None,
            runtime_minutes: Some(148),
            genres: vec![
                Genre {
                    id: 28,
                    name: "Action".to_string(),
                },
                Genre {
                    id: 878,
                    name: "Science Fiction".to_string(),
                },
            ],
            imdb_id: Some("tt1375666".to_string()),
        };

        assert_eq!(details.genre_ids(), vec![28, 878]);
    }

    #[test]
    fn test_watch_providers_deserialization() {
        let json = r#"{
            "id": 603,
            "results": {
                "US": {
                    "link": "https://www.themoviedb.org/movie/603/watch",
                    "flatrate": [
                        { "provider_id": 8, "provider_name": "Netflix", "logo_path": "/netflix.jpg" }
                    ],
                    "rent": [
                        { "provider_id": 2, "provider_name": "Apple TV" }
                    ]
                }
            }
        }"#;

        let providers: TmdbWatchProviders = serde_json::from_str(json).unwrap();
        let us = providers.results.get("US").unwrap();
        assert_eq!(us.flatrate.as_ref().unwrap()[0].provider_name, "Netflix");
        assert_eq!(us.rent.as_ref().unwrap()[0].provider_id, 2);
        assert!(us.buy.is_none());
    }
}
