//! Address geocoding for BMLT meeting searches.
//!
//! Wraps a single HTTP geocoding lookup (Nominatim by default) with:
//!
//! - a process-wide [`RateLimiter`] (the public Nominatim instance allows ~1 request/second)
//! - a bounded, time-expiring [`ResultCache`]
//! - retry with backoff on rate limiting and transient network failures ([`RetryPolicy`])
//! - a one-step simplification fallback ([`SmartGeocoder`])
//!
//! Failures are values, not errors: every lookup resolves to a [`GeocodeOutcome`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use bmlt_geocoding::{GeocodeClient, GeocodeContext, GeocoderConfig, NominatimTransport, SmartGeocoder};
//!
//! # async fn run() -> bmlt_geocoding::Result<()> {
//! let context = Arc::new(GeocodeContext::default());
//! let transport = NominatimTransport::new(GeocoderConfig::default())?;
//! let geocoder = SmartGeocoder::new(GeocodeClient::new(transport, context));
//!
//! let outcome = geocoder.smart_geocode("123 Main St, Springfield, IL 62704").await;
//! if let Some(hit) = outcome.hit() {
//!     println!("{}, {}", hit.latitude, hit.longitude);
//! }
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod cache;
pub mod client;
pub mod error;
pub mod outcome;
pub mod rate_limiter;
pub mod retry;
pub mod smart;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use address::looks_like_address;
pub use cache::{cache_key, CacheConfig, ResultCache};
pub use client::{GeocodeClient, GeocodeContext};
pub use error::{GeocodeError, Result, RetryClass};
pub use outcome::{FailureKind, GeocodeHit, GeocodeOutcome};
pub use rate_limiter::RateLimiter;
pub use retry::{RetryDecision, RetryPolicy};
pub use smart::{simplify_address, SmartGeocoder};
pub use transport::{
    GeocodeTransport, GeocoderConfig, NominatimTransport, Place, NOMINATIM_SEARCH_URL,
};
