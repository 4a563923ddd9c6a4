use serde::{Deserialize, Serialize};

/// Streaming platforms we know how to deep-link into.
///
/// The upstream watch-providers payload identifies providers by display name
/// only; anything we can't map is ignored rather than surfaced as an unknown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Netflix,
    PrimeVideo,
    DisneyPlus,
    Hulu,
    Max,
    AppleTv,
    ParamountPlus,
    Peacock,
    Tubi,
    Vudu,
    GooglePlay,
    Youtube,
}

impl Platform {
    /// Maps a normalized (lowercased, trimmed) upstream provider name to a
    /// platform. Returns `None` for providers we have no entry for.
    pub fn from_provider_name(name: &str) -> Option<Platform> {
        let normalized = name.trim().to_lowercase();
        match normalized.as_str() {
            "netflix" | "netflix standard with ads" => Some(Platform::Netflix),
            "amazon prime video" | "prime video" | "amazon video" => Some(Platform::PrimeVideo),
            "disney plus" | "disney+" => Some(Platform::DisneyPlus),
            "hulu" => Some(Platform::Hulu),
            "max" | "hbo max" | "max amazon channel" => Some(Platform::Max),
            "apple tv" | "apple tv+" | "apple tv plus" => Some(Platform::AppleTv),
            "paramount plus" | "paramount+" | "paramount+ with showtime" => {
                Some(Platform::ParamountPlus)
            }
            "peacock" | "peacock premium" | "peacock premium plus" => Some(Platform::Peacock),
            "tubi" | "tubi tv" => Some(Platform::Tubi),
            "vudu" | "fandango at home" => Some(Platform::Vudu),
            "google play movies" => Some(Platform::GooglePlay),
            "youtube" => Some(Platform::Youtube),
            _ => None,
        }
    }

    /// Hand-maintained landing URL for the platform.
    ///
    /// Upstream links point at an aggregator page; clients want the platform
    /// itself.
    pub fn watch_url(&self) -> &'static str {
        match self {
            Platform::Netflix => "https://www.netflix.com",
            Platform::PrimeVideo => "https://www.primevideo.com",
            Platform::DisneyPlus => "https://www.disneyplus.com",
            Platform::Hulu => "https://www.hulu.com",
            Platform::Max => "https://www.max.com",
            Platform::AppleTv => "https://tv.apple.com",
            Platform::ParamountPlus => "https://www.paramountplus.com",
            Platform::Peacock => "https://www.peacocktv.com",
            Platform::Tubi => "https://tubitv.com",
            Platform::Vudu => "https://www.vudu.com",
            Platform::GooglePlay => "https://play.google.com/store/movies",
            Platform::Youtube => "https://www.youtube.com",
        }
    }
}

/// Upstream's categorization of a streaming offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
    /// Included with a subscription (upstream calls this "flatrate").
    Subscription,
    Rent,
    Buy,
    Free,
    Ads,
}

impl OfferType {
    /// Parses an upstream offer bucket name. Unknown buckets yield `None`
    /// and are skipped by callers.
    pub fn from_bucket(bucket: &str) -> Option<OfferType> {
        match bucket.to_lowercase().as_str() {
            "flatrate" | "subscription" => Some(OfferType::Subscription),
            "rent" => Some(OfferType::Rent),
            "buy" | "purchase" => Some(OfferType::Buy),
            "free" => Some(OfferType::Free),
            "ads" => Some(OfferType::Ads),
            _ => None,
        }
    }
}
