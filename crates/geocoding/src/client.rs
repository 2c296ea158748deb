use crate::cache::{CacheConfig, ResultCache};
use crate::error::Result;
use crate::outcome::{FailureKind, GeocodeOutcome};
use crate::rate_limiter::{RateLimiter, DEFAULT_MIN_INTERVAL};
use crate::retry::{RetryDecision, RetryPolicy};
use crate::transport::GeocodeTransport;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Per-process geocoding state: one limiter and one cache shared by every client built on it.
#[derive(Debug)]
pub struct GeocodeContext {
    limiter: RateLimiter,
    cache: Mutex<ResultCache>,
}

impl GeocodeContext {
    pub fn new(min_interval: Duration, cache: CacheConfig) -> Self {
        Self {
            limiter: RateLimiter::new(min_interval),
            cache: Mutex::new(ResultCache::new(cache)),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn cached(&self, address: &str) -> Option<GeocodeOutcome> {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
    }

    pub fn remember(&self, address: &str, outcome: GeocodeOutcome) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .set(address, outcome);
    }

    pub fn cached_len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for GeocodeContext {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL, CacheConfig::default())
    }
}

/// Geocodes one address with caching, rate limiting and retry.
pub struct GeocodeClient<T> {
    transport: T,
    context: Arc<GeocodeContext>,
    policy: RetryPolicy,
}

impl<T: GeocodeTransport> GeocodeClient<T> {
    pub fn new(transport: T, context: Arc<GeocodeContext>) -> Self {
        Self {
            transport,
            context,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn context(&self) -> &Arc<GeocodeContext> {
        &self.context
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn geocode(&self, address: &str) -> GeocodeOutcome {
        self.geocode_with_attempts(address, self.policy.max_attempts)
            .await
    }

    pub async fn geocode_with_attempts(&self, address: &str, max_attempts: u32) -> GeocodeOutcome {
        let query = address.trim();
        if query.is_empty() {
            return GeocodeOutcome::failure(FailureKind::EmptyInput, "Address cannot be empty");
        }

        if let Some(cached) = self.context.cached(query) {
            return cached;
        }

        let policy = self.policy.with_max_attempts(max_attempts);
        for attempt in 1..=max_attempts {
            self.context.limiter().wait_if_needed().await;
            log::debug!("Geocoding attempt {attempt}/{max_attempts} for: {query:?}");

            let err = match self.lookup(query).await {
                Ok(outcome) => {
                    if outcome.is_cacheable() {
                        self.context.remember(query, outcome.clone());
                    }
                    return outcome;
                }
                Err(err) => err,
            };

            log::warn!("Geocoding attempt {attempt} failed for {query:?}: {err}");
            match policy.classify(attempt, &err) {
                RetryDecision::RetryAfter(delay) => {
                    log::info!(
                        "Retrying geocoding in {}ms (attempt {}/{max_attempts})",
                        delay.as_millis(),
                        attempt + 1
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::Stop => {
                    return GeocodeOutcome::failure(err.failure_kind(), err.to_string());
                }
            }
        }

        GeocodeOutcome::failure(FailureKind::UnknownError, "All geocoding attempts failed")
    }

    /// A single dispatch. `Ok` carries a definitive answer (hit or no-results).
    async fn lookup(&self, query: &str) -> Result<GeocodeOutcome> {
        let places = self.transport.search(query).await?;
        let Some(first) = places.first() else {
            return Ok(GeocodeOutcome::failure(
                FailureKind::NoResultsFound,
                format!("No geocoding results found for address: {query}"),
            ));
        };

        let hit = first.to_hit()?;
        log::info!(
            "Geocoded {query:?} to: {}, {}",
            hit.latitude,
            hit.longitude
        );
        Ok(GeocodeOutcome::Success(hit))
    }
}

impl<T> std::fmt::Debug for GeocodeClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodeClient")
            .field("context", &self.context)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
