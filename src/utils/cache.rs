//! Time-Based Response Cache
//!
//! Holds auxiliary fetched data (klines) between cycles. Entries carry the
//! Unix time of their last fetch; a lookup misses once `ttl` has elapsed.

use std::collections::HashMap;
use std::hash::Hash;

/// Simple time-based cache keyed by arbitrary hashable keys
pub struct TtlCache<K, V> {
    data: HashMap<K, (V, i64)>,
    ttl_secs: i64,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            data: HashMap::new(),
            ttl_secs: ttl_secs as i64,
        }
    }

    /// Value for `key` if it was fetched less than `ttl` seconds before `now`
    pub fn get(&self, key: &K, now: i64) -> Option<V> {
        self.data.get(key).and_then(|(value, fetched_at)| {
            if now - fetched_at < self.ttl_secs {
                Some(value.clone())
            } else {
                None
            }
        })
    }

    pub fn insert(&mut self, key: K, value: V, now: i64) {
        self.data.insert(key, (value, now));
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove expired entries
    pub fn cleanup(&mut self, now: i64) {
        let ttl = self.ttl_secs;
        self.data.retain(|_, (_, fetched_at)| now - *fetched_at < ttl);
    }
}
