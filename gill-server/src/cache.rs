//! Explicit TTL cache with an injected clock.
//!
//! Short-lived caching for repository reads (active routes, configuration)
//! without ambient static state: the cache is constructed where it is
//! needed and handed to its consumers. Time comes from a [`Clock`] so
//! tests control expiry deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::NaiveDateTime;

/// Source of wall-clock time.
///
/// Injected everywhere the core needs "now": cache expiry, record
/// timestamps, and the day-of-week matching filter.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// The local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// A clock that only moves when told to. For tests and demos.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn starting_at(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, delta: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Entry<T> {
    value: T,
    expires_at: NaiveDateTime,
}

/// A key-value cache whose entries expire after a fixed TTL.
///
/// Expired entries are evicted lazily on read; `purge_expired` sweeps the
/// rest. Keys are namespaced strings so `clear` can drop a whole prefix.
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Get a live entry, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: T) {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(NaiveDateTime::MAX);
        self.lock().insert(key.into(), Entry { value, expires_at });
    }

    /// Remove every entry whose key starts with `pattern`. An empty
    /// pattern clears the whole cache.
    pub fn clear(&self, pattern: &str) {
        self.lock().retain(|key, _| !key.starts_with(pattern));
    }

    /// Drop all expired entries.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.lock().retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
