use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Spacing between outbound requests. Nominatim's usage policy is 1 req/s; keep a margin.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1100);

/// Enforces a minimum interval between geocoding dispatches.
///
/// The check and the stamp are two separate critical sections: callers are expected to
/// dispatch sequentially. Two tasks entering `wait_if_needed` at the same time can both
/// observe the same `last_dispatch` and proceed together.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn last_dispatch(&self) -> Option<Instant> {
        *self
            .last_dispatch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps until `min_interval` has passed since the previous dispatch, then records
    /// the current instant as the new dispatch time.
    pub async fn wait_if_needed(&self) {
        if let Some(last) = self.last_dispatch() {
            let elapsed = last.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                log::debug!(
                    "Rate limiting: waiting {}ms before next geocoding request",
                    wait.as_millis()
                );
                tokio::time::sleep(wait).await;
            }
        }

        *self
            .last_dispatch
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
