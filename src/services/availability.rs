use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::{
    error::AppResult,
    models::{MovieAvailability, OfferType, Platform, StreamingOffer, TmdbProviderRef, TmdbRegionOffers},
    services::source::MovieSource,
};

/// Reshapes upstream watch-provider payloads into typed offers.
///
/// Upstream identifies providers by display name; names we can map go
/// through the static platform table, everything else is dropped with a
/// debug log rather than surfaced as an unknown entry.
pub struct AvailabilityService {
    source: Arc<dyn MovieSource>,
}

impl AvailabilityService {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        Self { source }
    }

    /// Streaming availability for one movie in one region.
    pub async fn availability(&self, movie_id: i64, region: &str) -> AppResult<MovieAvailability> {
        let offers = self.source.watch_providers(movie_id, region).await?;
        let availability = self.convert_offers(movie_id, region, offers);

        tracing::info!(
            movie_id = movie_id,
            region = %region,
            offers = availability.offers.len(),
            "Availability fetched"
        );

        Ok(availability)
    }

    fn convert_offers(
        &self,
        movie_id: i64,
        region: &str,
        raw: TmdbRegionOffers,
    ) -> MovieAvailability {
        let buckets: [(&str, Option<Vec<TmdbProviderRef>>); 5] = [
            ("flatrate", raw.flatrate),
            ("rent", raw.rent),
            ("buy", raw.buy),
            ("free", raw.free),
            ("ads", raw.ads),
        ];

        let mut offers = Vec::new();
        // A provider family can appear several times in one bucket
        // (e.g. base and ad-supported tiers); collapse to one offer.
        let mut emitted: HashSet<(Platform, OfferType)> = HashSet::new();

        for (bucket, providers) in buckets {
            let Some(offer_type) = OfferType::from_bucket(bucket) else {
                continue;
            };

            for provider in providers.unwrap_or_default() {
                match Platform::from_provider_name(&provider.provider_name) {
                    Some(platform) => {
                        if emitted.insert((platform, offer_type)) {
                            offers.push(StreamingOffer {
                                platform,
                                provider_name: provider.provider_name,
                                offer_type,
                                watch_url: platform.watch_url().to_string(),
                            });
                        }
                    }
                    None => {
                        tracing::debug!(
                            provider = %provider.provider_name,
                            "Unknown streaming provider, skipping"
                        );
                    }
                }
            }
        }

        MovieAvailability {
            movie_id,
            region: region.to_uppercase(),
            offers,
            cached_at: Utc::now(),
        }
    }
}
