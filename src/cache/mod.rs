//! Deterministic Cache (C7): an LRU+TTL cache keyed by a canonical, order-insensitive
//! fingerprint of the request (spec §4.7).
//!
//! The source design's cache (`utils/cache.rs`) is a hybrid on-disk/in-memory cache
//! built on `foyer`, sized for a different workload (durable response history across
//! process restarts). The invariants here — deep-copy isolation, a single exclusive
//! lock, SHA-256 fingerprinting — call for a plain in-memory structure instead;
//! `foyer` is dropped (see DESIGN.md) in favor of an `IndexMap`-backed LRU, reusing a
//! dependency the rest of the crate already carries.

mod fingerprint;

pub use fingerprint::cache_key;

use std::sync::Mutex;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::data::Message;
use crate::lm::{GenerateOptions, GenerateResult};

const DEFAULT_CAPACITY: usize = 1000;

struct Entry {
    value: GenerateResult,
    inserted_at: Instant,
}

struct Inner {
    entries: IndexMap<String, Entry>,
    capacity: usize,
    ttl: Option<Duration>,
    hits: u64,
    misses: u64,
}

/// Thread-safe LRU cache of [`GenerateResult`]s, keyed by [`cache_key`]. All
/// operations run under a single exclusive lock (spec §4.7): this is a short
/// critical section with no I/O, so a `std::sync::Mutex` is sufficient.
pub struct Cache {
    inner: Mutex<Inner>,
}

impl Default for Cache {
    fn default() -> Self {
        Cache::new(DEFAULT_CAPACITY, None)
    }
}

/// Alias kept for the name the spec and DESIGN.md use for this component.
pub type DeterministicCache = Cache;

impl Cache {
    /// `capacity == 0` is invalid and falls back to [`DEFAULT_CAPACITY`].
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        let capacity = if capacity == 0 { DEFAULT_CAPACITY } else { capacity };
        Cache {
            inner: Mutex::new(Inner {
                entries: IndexMap::new(),
                capacity,
                ttl,
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Builds the fingerprint for `(model, messages, options)` and looks it up.
    pub fn get(&self, model: &str, messages: &[Message], options: &GenerateOptions) -> Option<GenerateResult> {
        let key = cache_key(model, messages, options);
        self.get_by_key(&key)
    }

    /// Looks up an already-computed key, moving it to most-recently-used on a hit
    /// and evicting it if TTL has elapsed. Returns a deep copy (I4).
    pub fn get_by_key(&self, key: &str) -> Option<GenerateResult> {
        let mut inner = self.inner.lock().unwrap();

        let expired = match (&inner.ttl, inner.entries.get(key)) {
            (Some(ttl), Some(entry)) => entry.inserted_at.elapsed() > *ttl,
            _ => false,
        };

        if expired {
            inner.entries.shift_remove(key);
            inner.misses += 1;
            return None;
        }

        match inner.entries.shift_remove(key) {
            Some(entry) => {
                let value = entry.value.clone();
                inner.entries.insert(
                    key.to_string(),
                    Entry {
                        value: value.clone(),
                        inserted_at: entry.inserted_at,
                    },
                );
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Inserts/overwrites the fingerprint for `(model, messages, options)` with
    /// `value`, deep-copying it on the way in (I4). New keys push to
    /// most-recently-used and evict the least-recently-used entry once capacity is
    /// exceeded; existing keys overwrite in place and also move to the front.
    pub fn set(&self, model: &str, messages: &[Message], options: &GenerateOptions, value: GenerateResult) -> String {
        let key = cache_key(model, messages, options);
        self.set_by_key(key.clone(), value);
        key
    }

    pub fn set_by_key(&self, key: String, value: GenerateResult) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.shift_remove(&key);
        inner.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
        while inner.entries.len() > inner.capacity {
            inner.entries.shift_remove_index(0);
        }
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> u64 {
        self.inner.lock().unwrap().hits
    }

    pub fn misses(&self) -> u64 {
        self.inner.lock().unwrap().misses
    }
}
