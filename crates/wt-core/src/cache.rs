//! Time-to-live cache with an explicit sweep.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    /// `None` when `now + ttl` overflows `Instant`; such entries never expire.
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now > at)
    }
}

/// A key → (value, expiry) map.
///
/// Entries are valid up to and including `inserted_at + ttl`. Expired entries
/// are never returned; they are removed lazily by [`get_at`](Self::get_at) or in
/// bulk by [`sweep_at`](Self::sweep_at).
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: HashMap<K, Entry<V>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Returns a live entry, dropping it if it has expired.
    pub fn get_at(&mut self, key: &K, now: Instant) -> Option<V> {
        let expired = self.entries.get(key)?.is_expired(now);
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&mut self, key: K, value: V, now: Instant) {
        let entry = Entry {
            value,
            expires_at: now.checked_add(self.ttl),
        };
        self.entries.insert(key, entry);
    }

    /// Drops an entry. Returns whether one was present.
    pub fn invalidate(&mut self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn sweep(&mut self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Removes every expired entry and returns how many were removed.
    pub fn sweep_at(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before - self.entries.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(5);

    #[test]
    fn entry_is_live_until_ttl_elapses() {
        let now = Instant::now();
        let mut cache = TtlCache::new(TTL);
        cache.insert_at("emp-1", 7, now);

        assert_eq!(cache.get_at(&"emp-1", now), Some(7));
        assert_eq!(cache.get_at(&"emp-1", now + TTL), Some(7));
        assert_eq!(cache.get_at(&"emp-1", now + TTL + Duration::from_millis(1)), None);
        assert!(cache.is_empty(), "expired entry is removed on read");
    }

    #[test]
    fn insert_replaces_value_and_expiry() {
        let now = Instant::now();
        let mut cache = TtlCache::new(TTL);
        cache.insert_at("k", 1, now);
        cache.insert_at("k", 2, now + Duration::from_secs(4));

        assert_eq!(cache.get_at(&"k", now + Duration::from_secs(8)), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_removes_entry() {
        let mut cache = TtlCache::new(TTL);
        cache.insert("k", 1);
        assert!(cache.invalidate(&"k"));
        assert!(!cache.invalidate(&"k"));
        assert_eq!(cache.get(&"k"), None);
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let now = Instant::now();
        let mut cache = TtlCache::new(TTL);
        cache.insert_at("old", 1, now);
        cache.insert_at("mid", 2, now + Duration::from_secs(3));
        cache.insert_at("new", 3, now + Duration::from_secs(6));

        let removed = cache.sweep_at(now + Duration::from_secs(9));
        assert_eq!(removed, 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at(&"new", now + Duration::from_secs(9)), Some(3));
    }

    #[test]
    fn zero_ttl_expires_immediately_after_insert_instant() {
        let now = Instant::now();
        let mut cache = TtlCache::new(Duration::ZERO);
        cache.insert_at("k", 1, now);
        assert_eq!(cache.get_at(&"k", now + Duration::from_nanos(1)), None);
    }
}
