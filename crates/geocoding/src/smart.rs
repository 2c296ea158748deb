use crate::client::GeocodeClient;
use crate::outcome::GeocodeOutcome;
use crate::transport::GeocodeTransport;

/// Geocoding with a single simplification fallback.
///
/// When the full string fails and contains commas, the last two comma-separated segments
/// (typically "City, ST ZIP") are tried once. At most two distinct lookups per call.
#[derive(Debug)]
pub struct SmartGeocoder<T> {
    client: GeocodeClient<T>,
}

impl<T: GeocodeTransport> SmartGeocoder<T> {
    pub fn new(client: GeocodeClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &GeocodeClient<T> {
        &self.client
    }

    pub async fn smart_geocode(&self, search: &str) -> GeocodeOutcome {
        let outcome = self.client.geocode(search).await;
        if outcome.is_success() {
            return outcome;
        }

        let Some(simplified) = simplify_address(search) else {
            return outcome;
        };
        log::info!("Geocoding failed for {search:?}, trying simplified: {simplified:?}");
        self.client.geocode(&simplified).await
    }
}

/// Keeps the last two comma-separated segments, or `None` if that changes nothing.
pub fn simplify_address(search: &str) -> Option<String> {
    if !search.contains(',') {
        return None;
    }
    let segments: Vec<&str> = search.split(',').collect();
    let tail = &segments[segments.len().saturating_sub(2)..];
    let simplified = tail.join(",").trim().to_string();
    (simplified != search.trim()).then_some(simplified)
}
