//! Bounded, TTL-aware memoization of whole parse results.
//!
//! The cache maps caller-supplied string fingerprints to [`ParseOutcome`]
//! values. Entries expire after a configured time-to-live and are evicted
//! lazily when read; capacity pressure evicts the oldest-inserted entry
//! (insertion order, not access order - reads never refresh recency). Both
//! successful and failed results are cacheable; there is no policy against
//! memoizing negative results.

use crate::error::ParseOutcome;
use log::{debug, trace};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Capacity and expiry configuration for a [`ResultCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of resident entries before insertion evicts the
    /// oldest-inserted one.
    pub max_size: usize,
    /// Entries older than this are treated as absent.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_size: 1000,
            ttl: Duration::from_secs(60),
        }
    }
}

struct CacheEntry {
    result: ParseOutcome,
    inserted_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    // Insertion order; kept in sync with `entries` on every removal.
    order: VecDeque<String>,
}

impl CacheState {
    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.order.retain(|resident| resident != key);
        }
    }
}

/// Insertion-ordered, bounded, TTL-based cache of parse results.
///
/// The cache is the only shared mutable state on the parse path, so it is
/// guarded by a mutex and safe to share across threads.
pub struct ResultCache {
    state: Mutex<CacheState>,
    config: CacheConfig,
}

impl ResultCache {
    /// Create a cache with the given configuration.
    pub fn new(config: CacheConfig) -> Self {
        ResultCache {
            state: Mutex::new(CacheState::default()),
            config,
        }
    }

    /// Look up a fingerprint, treating expired entries as absent.
    ///
    /// An expired entry is removed on the spot rather than waiting for
    /// [`ResultCache::cleanup`].
    pub fn get(&self, key: &str) -> Option<ParseOutcome> {
        let mut state = self.state.lock().expect("result cache lock poisoned");
        let expired = state.entries.get(key)?.inserted_at.elapsed() > self.config.ttl;
        if expired {
            trace!("result cache entry expired: {key}");
            state.remove(key);
            return None;
        }
        state.entries.get(key).map(|entry| entry.result.clone())
    }

    /// Store a result under a fingerprint.
    ///
    /// Inserting a previously absent key at capacity evicts the single
    /// oldest-inserted entry first; overwriting an existing key keeps its
    /// original insertion position and never evicts.
    pub fn set(&self, key: impl Into<String>, result: ParseOutcome) {
        let key = key.into();
        let mut state = self.state.lock().expect("result cache lock poisoned");
        if !state.entries.contains_key(&key) && state.entries.len() >= self.config.max_size {
            if let Some(oldest) = state.order.pop_front() {
                debug!("result cache full, evicting oldest entry: {oldest}");
                state.entries.remove(&oldest);
            }
        }
        let entry = CacheEntry {
            result,
            inserted_at: Instant::now(),
        };
        if state.entries.insert(key.clone(), entry).is_none() {
            state.order.push_back(key);
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut state = self.state.lock().expect("result cache lock poisoned");
        state.entries.clear();
        state.order.clear();
    }

    /// Number of resident entries, including any not yet swept as expired.
    pub fn len(&self) -> usize {
        self.state
            .lock()
            .expect("result cache lock poisoned")
            .entries
            .len()
    }

    /// Whether the cache has no resident entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Proactively sweep every expired entry.
    pub fn cleanup(&self) {
        let mut state = self.state.lock().expect("result cache lock poisoned");
        let ttl = self.config.ttl;
        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.inserted_at.elapsed() > ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in expired {
            trace!("sweeping expired result cache entry: {key}");
            state.remove(&key);
        }
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("len", &self.len())
            .field("config", &self.config)
            .finish()
    }
}
