use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A cached upstream body, stored exactly as fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

struct CacheEntry {
    page: CachedPage,
    stored_at: Instant,
}

/// Process-wide response cache keyed by upstream URL.
///
/// Entries live for `ttl` from insertion. Expiry is lazy: an expired entry is
/// removed by the lookup that finds it. When full, inserting drops the oldest
/// entry.
pub struct ResponseCache {
    ttl: Duration,
    max_entries: usize,
    clock: Box<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self::with_clock(ttl, max_entries, Box::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, max_entries: usize, clock: Box<dyn Clock>) -> Self {
        Self {
            ttl,
            max_entries: max_entries.max(1),
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &str) -> Option<CachedPage> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let fresh = match entries.get(key) {
            Some(entry) => now.saturating_duration_since(entry.stored_at) < self.ttl,
            None => return None,
        };
        if fresh {
            entries.get(key).map(|entry| entry.page.clone())
        } else {
            entries.remove(key);
            log::debug!("cache entry expired for {key}");
            None
        }
    }

    pub fn insert(&self, key: String, page: CachedPage) {
        let now = self.clock.now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(&key)
            && entries.len() >= self.max_entries
            && let Some(victim) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.stored_at)
                .map(|(k, _)| k.clone())
        {
            entries.remove(&victim);
        }
        entries.insert(key, CacheEntry { page, stored_at: now });
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Hand-advanced clock for expiry tests.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct ManualClock {
    now: std::sync::Arc<Mutex<Instant>>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Self {
        Self { now: std::sync::Arc::new(Mutex::new(Instant::now())) }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}
