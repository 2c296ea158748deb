use crate::error::{describe, GeocodeError, Result};
use crate::outcome::GeocodeHit;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// BMLT root servers are overwhelmingly North American.
pub const DEFAULT_COUNTRY_CODES: &str = "us,ca";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// A candidate match as returned by the lookup service. Coordinates arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
}

impl Place {
    pub fn to_hit(&self) -> Result<GeocodeHit> {
        let latitude = parse_coordinate("lat", &self.lat)?;
        let longitude = parse_coordinate("lon", &self.lon)?;
        Ok(GeocodeHit {
            latitude,
            longitude,
            display_name: self.display_name.clone(),
        })
    }
}

fn parse_coordinate(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| GeocodeError::InvalidResponse(format!("invalid {field}: {raw:?}")))
}

/// One lookup against the geocoding service. No retries, no caching, no rate limiting.
#[async_trait]
pub trait GeocodeTransport: Send + Sync {
    /// Returns the candidate matches for `query`; an empty vec means "no results".
    async fn search(&self, query: &str) -> Result<Vec<Place>>;
}

#[derive(Clone, Debug)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub user_agent: String,
    pub country_codes: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: NOMINATIM_SEARCH_URL.to_string(),
            user_agent: format!(
                "BMLT-MCP-Server/{} (https://github.com/bmlt-enabled/bmlt-mcp-server)",
                env!("CARGO_PKG_VERSION")
            ),
            country_codes: DEFAULT_COUNTRY_CODES.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Nominatim `/search` over HTTP.
#[derive(Clone, Debug)]
pub struct NominatimTransport {
    http: reqwest::Client,
    config: GeocoderConfig,
}

impl NominatimTransport {
    pub fn new(config: GeocoderConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|err| GeocodeError::Client(describe(&err)))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }
}

#[async_trait]
impl GeocodeTransport for NominatimTransport {
    async fn search(&self, query: &str) -> Result<Vec<Place>> {
        let response = self
            .http
            .get(&self.config.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", self.config.country_codes.as_str()),
                ("addressdetails", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::from_status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str::<Vec<Place>>(&body)
            .map_err(|err| GeocodeError::InvalidResponse(err.to_string()))
    }
}
