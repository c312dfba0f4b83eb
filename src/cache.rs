//! Result cache for filtered views
//!
//! Keys are SHA-256 digests of a canonical encoding of the selection, so two
//! selections holding the same values produce the same key whatever order the
//! values arrived in. The cache is a pure optimization: a disabled or cold
//! cache yields exactly the same views, only slower.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};

use crate::config::CacheConfig;
use crate::selection::{Dimension, FilterSelection};

/// 256-bit key identifying a canonicalized selection
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Derive the key for a selection
    ///
    /// Every dimension is written in a fixed order, with its values sorted
    /// and length-prefixed, followed by the map-selected city.
    #[must_use]
    pub fn for_selection(selection: &FilterSelection) -> Self {
        let mut hasher = Sha256::new();
        for dimension in Dimension::ALL {
            let values = selection.values(dimension);
            hasher.update([dimension as u8]);
            hasher.update((values.len() as u64).to_le_bytes());
            for value in values {
                write_str(&mut hasher, value);
            }
        }
        match &selection.map_city {
            Some(city) => {
                hasher.update([1]);
                write_str(&mut hasher, city);
            }
            None => hasher.update([0]),
        }
        Self(hasher.finalize().into())
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({self})")
    }
}

/// Memoizes computed values by key
pub trait ResultCache<V>: Send + Sync {
    /// Return the stored value for `key`, or run `compute`, store and return it
    fn get_or_compute(&self, key: &CacheKey, compute: &dyn Fn() -> V) -> Arc<V>;

    /// Number of stored entries, expired ones included
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored entry
    fn clear(&self);
}

/// A cache that never stores anything
#[derive(Debug)]
pub struct NoopCache<V> {
    _phantom: PhantomData<fn() -> V>,
}

impl<V> NoopCache<V> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<V> Default for NoopCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ResultCache<V> for NoopCache<V> {
    fn get_or_compute(&self, _key: &CacheKey, compute: &dyn Fn() -> V) -> Arc<V> {
        Arc::new(compute())
    }

    fn len(&self) -> usize {
        0
    }

    fn clear(&self) {}
}

#[derive(Debug)]
struct Entry<V> {
    value: Arc<V>,
    inserted_at: Instant,
    expires_at: Instant,
}

/// Hit/miss counters of a [`TtlCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Thread-safe cache whose entries expire a fixed time after insertion
///
/// Lookups take a read lock; the value is computed outside any lock, so two
/// concurrent misses on the same key may both compute. The last insert wins,
/// which is harmless because equal keys always compute equal values.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<FxHashMap<CacheKey, Entry<V>>>,
    ttl: Duration,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> TtlCache<V> {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            ttl,
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl, config.max_entries)
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.read_len(),
        }
    }

    /// Remove every entry that has expired by `now`
    pub fn purge_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    /// [`ResultCache::get_or_compute`] evaluated at an explicit instant
    pub fn get_or_compute_at(
        &self,
        key: &CacheKey,
        now: Instant,
        compute: &dyn Fn() -> V,
    ) -> Arc<V> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = entries.get(key) {
                if entry.expires_at > now {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    log::debug!("Cache hit for {key}");
                    return Arc::clone(&entry.value);
                }
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        log::debug!("Cache miss for {key}");
        let value = Arc::new(compute());

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.max_entries && !entries.contains_key(key) {
            Self::evict(&mut entries, now, self.max_entries);
        }
        entries.insert(
            *key,
            Entry {
                value: Arc::clone(&value),
                inserted_at: now,
                expires_at: now + self.ttl,
            },
        );
        value
    }

    /// Make room for one insert: drop expired entries, then the oldest
    fn evict(entries: &mut FxHashMap<CacheKey, Entry<V>>, now: Instant, max_entries: usize) {
        entries.retain(|_, entry| entry.expires_at > now);
        while entries.len() >= max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(key, _)| *key);
            match oldest {
                Some(key) => {
                    entries.remove(&key);
                }
                None => break,
            }
        }
    }

    fn read_len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<V: Send + Sync> ResultCache<V> for TtlCache<V> {
    fn get_or_compute(&self, key: &CacheKey, compute: &dyn Fn() -> V) -> Arc<V> {
        self.get_or_compute_at(key, Instant::now(), compute)
    }

    fn len(&self) -> usize {
        self.read_len()
    }

    fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Build the cache described by `config`
#[must_use]
pub fn from_config<V: Send + Sync + 'static>(config: &CacheConfig) -> Arc<dyn ResultCache<V>> {
    if config.enabled {
        Arc::new(TtlCache::from_config(config))
    } else {
        Arc::new(NoopCache::new())
    }
}
