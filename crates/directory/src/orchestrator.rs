//! Address-aware rewriting of meeting searches.

use crate::params::SearchParams;
use async_trait::async_trait;
use bmlt_geocoding::{
    looks_like_address, GeocodeHit, GeocodeOutcome, GeocodeTransport, SmartGeocoder,
};
use std::sync::Arc;

/// Radius in miles used when an address search does not name one.
pub const DEFAULT_RADIUS: f64 = 25.0;

/// Turns a free-text address into coordinates.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, address: &str) -> anyhow::Result<GeocodeOutcome>;
}

#[async_trait]
impl<T: GeocodeTransport> AddressResolver for SmartGeocoder<T> {
    async fn resolve(&self, address: &str) -> anyhow::Result<GeocodeOutcome> {
        Ok(self.smart_geocode(address).await)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchPlan {
    /// Not an address search; parameters are sent as given.
    PassThrough,
    /// Geocoded; parameters now describe a radius search around the hit.
    Coordinates(GeocodeHit),
    /// Geocoding failed; the string is sent as a plain text search.
    TextFallback { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSearch {
    pub params: SearchParams,
    pub plan: SearchPlan,
}

#[derive(Clone)]
pub struct SearchOrchestrator {
    resolver: Arc<dyn AddressResolver>,
}

impl SearchOrchestrator {
    pub fn new(resolver: Arc<dyn AddressResolver>) -> Self {
        Self { resolver }
    }

    pub async fn prepare(&self, params: SearchParams) -> PreparedSearch {
        if !params.is_address_search() {
            if let Some(text) = address_hint(&params) {
                log::debug!(
                    "{text:?} looks like an address; set StringSearchIsAnAddress=1 for a location search"
                );
            }
            return PreparedSearch {
                params,
                plan: SearchPlan::PassThrough,
            };
        }
        let address = params.search_string.clone().unwrap_or_default();
        log::info!("Address search detected: {address:?}, converting to coordinate search");

        let outcome = match self.resolver.resolve(&address).await {
            Ok(outcome) => outcome,
            Err(err) => {
                log::warn!("Error during geocoding for {address:?}: {err:#}");
                return text_fallback(params, err.to_string());
            }
        };

        match outcome {
            GeocodeOutcome::Success(hit) => {
                log::info!(
                    "Geocoded {address:?} to coordinates: {}, {}",
                    hit.latitude,
                    hit.longitude
                );
                coordinate_search(params, hit)
            }
            GeocodeOutcome::Failure { reason, .. } => {
                log::warn!("Geocoding failed for {address:?}: {reason}");
                text_fallback(params, reason)
            }
        }
    }
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator").finish_non_exhaustive()
    }
}

/// The search string of a text search that reads like an address.
fn address_hint(params: &SearchParams) -> Option<&str> {
    if params.string_search_is_an_address == Some(1) {
        return None;
    }
    params
        .search_string
        .as_deref()
        .filter(|text| looks_like_address(text))
}

fn coordinate_search(mut params: SearchParams, hit: GeocodeHit) -> PreparedSearch {
    // A zero radius means "not given".
    let radius = params
        .search_string_radius
        .take()
        .filter(|r| *r != 0.0 && r.is_finite())
        .unwrap_or(DEFAULT_RADIUS);

    params.lat_val = Some(hit.latitude);
    params.long_val = Some(hit.longitude);
    params.geo_width = Some(radius);
    params.sort_results_by_distance = Some(1);
    params.search_string = None;
    params.string_search_is_an_address = None;

    PreparedSearch {
        params,
        plan: SearchPlan::Coordinates(hit),
    }
}

fn text_fallback(mut params: SearchParams, reason: String) -> PreparedSearch {
    params.string_search_is_an_address = Some(0);
    PreparedSearch {
        params,
        plan: SearchPlan::TextFallback { reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmlt_geocoding::FailureKind;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    struct Fixed {
        reply: Mutex<Option<anyhow::Result<GeocodeOutcome>>>,
        seen: Mutex<Vec<String>>,
    }

    impl Fixed {
        fn new(reply: anyhow::Result<GeocodeOutcome>) -> Arc<Self> {
            Arc::new(Self {
                reply: Mutex::new(Some(reply)),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl AddressResolver for Fixed {
        async fn resolve(&self, address: &str) -> anyhow::Result<GeocodeOutcome> {
            self.seen.lock().unwrap().push(address.to_string());
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(anyhow::anyhow!("resolver called twice")))
        }
    }

    fn oak_ave() -> SearchParams {
        SearchParams {
            search_string: Some("456 Oak Ave".into()),
            string_search_is_an_address: Some(1),
            weekdays: Some(crate::params::OneOrMany::One(2)),
            ..SearchParams::default()
        }
    }

    #[tokio::test]
    async fn geocoded_address_becomes_coordinate_search() {
        let resolver = Fixed::new(Ok(GeocodeOutcome::success(39.8, -89.6, "Oak Ave")));
        let orchestrator = SearchOrchestrator::new(resolver.clone());

        let prepared = orchestrator.prepare(oak_ave()).await;

        assert_eq!(
            prepared.params,
            SearchParams {
                lat_val: Some(39.8),
                long_val: Some(-89.6),
                geo_width: Some(25.0),
                sort_results_by_distance: Some(1),
                weekdays: Some(crate::params::OneOrMany::One(2)),
                ..SearchParams::default()
            }
        );
        assert!(matches!(prepared.plan, SearchPlan::Coordinates(_)));
        assert_eq!(*resolver.seen.lock().unwrap(), vec!["456 Oak Ave".to_string()]);

        let wire = serde_json::to_value(&prepared.params).unwrap();
        assert!(wire["SearchString"].is_null());
        assert!(wire["StringSearchIsAnAddress"].is_null());
        assert!(wire["SearchStringRadius"].is_null());
    }

    #[tokio::test]
    async fn caller_radius_is_used_as_geo_width() {
        let resolver = Fixed::new(Ok(GeocodeOutcome::success(39.8, -89.6, "Oak Ave")));
        let orchestrator = SearchOrchestrator::new(resolver);

        let mut params = oak_ave();
        params.search_string_radius = Some(10.0);
        let prepared = orchestrator.prepare(params).await;

        assert_eq!(prepared.params.geo_width, Some(10.0));
        assert_eq!(prepared.params.search_string_radius, None);
    }

    #[tokio::test]
    async fn failed_geocode_falls_back_to_text_search() {
        let resolver = Fixed::new(Ok(GeocodeOutcome::failure(
            FailureKind::NoResultsFound,
            "No geocoding results found for address: 456 Oak Ave",
        )));
        let orchestrator = SearchOrchestrator::new(resolver);

        let prepared = orchestrator.prepare(oak_ave()).await;

        assert_eq!(prepared.params.search_string.as_deref(), Some("456 Oak Ave"));
        assert_eq!(prepared.params.string_search_is_an_address, Some(0));
        assert_eq!(prepared.params.lat_val, None);
        assert!(matches!(prepared.plan, SearchPlan::TextFallback { .. }));
    }

    #[tokio::test]
    async fn resolver_error_is_treated_as_failure() {
        let resolver = Fixed::new(Err(anyhow::anyhow!("malformed response")));
        let orchestrator = SearchOrchestrator::new(resolver);

        let prepared = orchestrator.prepare(oak_ave()).await;

        assert_eq!(prepared.params.string_search_is_an_address, Some(0));
        assert_eq!(
            prepared.plan,
            SearchPlan::TextFallback {
                reason: "malformed response".into()
            }
        );
    }

    #[tokio::test]
    async fn text_searches_pass_through_without_geocoding() {
        let resolver = Fixed::new(Err(anyhow::anyhow!("should not be called")));
        let orchestrator = SearchOrchestrator::new(resolver.clone());

        let params = SearchParams {
            search_string: Some("Serenity".into()),
            string_search_is_an_address: Some(0),
            ..SearchParams::default()
        };
        let prepared = orchestrator.prepare(params.clone()).await;

        assert_eq!(prepared.params, params);
        assert_eq!(prepared.plan, SearchPlan::PassThrough);
        assert!(resolver.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn address_hint_flags_text_searches_that_read_like_addresses() {
        let text_search = |search: &str, flag: Option<u8>| SearchParams {
            search_string: Some(search.into()),
            string_search_is_an_address: flag,
            ..SearchParams::default()
        };

        assert_eq!(
            address_hint(&text_search("123 Main Street", Some(0))),
            Some("123 Main Street")
        );
        assert_eq!(
            address_hint(&text_search("Springfield, IL 62704", None)),
            Some("Springfield, IL 62704")
        );
        assert_eq!(address_hint(&text_search("Serenity Group", Some(0))), None);
        assert_eq!(address_hint(&text_search("123 Main Street", Some(1))), None);
        assert_eq!(address_hint(&SearchParams::default()), None);
    }

    #[tokio::test]
    async fn address_like_text_search_is_still_sent_as_text() {
        let resolver = Fixed::new(Err(anyhow::anyhow!("should not be called")));
        let orchestrator = SearchOrchestrator::new(resolver.clone());

        let params = SearchParams {
            search_string: Some("123 Main Street".into()),
            string_search_is_an_address: Some(0),
            ..SearchParams::default()
        };
        let prepared = orchestrator.prepare(params.clone()).await;

        assert_eq!(prepared.params, params);
        assert_eq!(prepared.plan, SearchPlan::PassThrough);
        assert!(resolver.seen.lock().unwrap().is_empty());
    }
}
