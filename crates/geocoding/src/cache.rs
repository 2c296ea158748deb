use crate::outcome::GeocodeOutcome;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone, Copy, Debug)]
pub struct CacheConfig {
    pub capacity: usize,
    pub max_age: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

/// Cache key for an address: trimmed and lowercased.
pub fn cache_key(address: &str) -> String {
    address.trim().to_lowercase()
}

#[derive(Debug, Clone)]
struct CacheEntry {
    outcome: GeocodeOutcome,
    created: Instant,
}

/// In-memory address → outcome memo.
///
/// Eviction is by insertion order (FIFO), not by access: reading an entry never extends
/// its life or moves it in the queue.
#[derive(Debug)]
pub struct ResultCache {
    config: CacheConfig,
    entries: HashMap<String, CacheEntry>,
    order: VecDeque<String>,
}

impl ResultCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the stored outcome, evicting it first if it has outlived `max_age`.
    pub fn get(&mut self, address: &str) -> Option<GeocodeOutcome> {
        let key = cache_key(address);
        let entry = self.entries.get(&key)?;

        if entry.created.elapsed() > self.config.max_age {
            self.forget(&key);
            return None;
        }

        log::debug!("Using cached geocoding result for: {address:?}");
        Some(entry.outcome.clone())
    }

    pub fn set(&mut self, address: &str, outcome: GeocodeOutcome) {
        if self.config.capacity == 0 {
            return;
        }
        let key = cache_key(address);
        let entry = CacheEntry {
            outcome,
            created: Instant::now(),
        };

        // Overwrites keep their queue position.
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = entry;
            return;
        }

        while self.entries.len() >= self.config.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, entry);
    }

    fn forget(&mut self, key: &str) {
        self.entries.remove(key);
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
