// ABOUTME: TTL-expiring, capacity-bounded in-memory cache of resolved metadata keyed by normalized URL.
// ABOUTME: Expiry is checked lazily on get; an over-capacity set evicts the single oldest entry.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};
use crate::metadata::LinkMetadata;
use crate::options::CacheOptions;

/// A stored value with its lifetime bounds.
#[derive(Debug, Clone)]
pub struct CacheItem<T> {
    pub data: T,
    pub created_at: Instant,
    pub expires_at: Instant,
    /// Insertion counter, breaks `created_at` ties.
    seq: u64,
}

impl<T> CacheItem<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Snapshot of the cache contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    /// Normalized keys, oldest first.
    pub keys: Vec<String>,
}

#[derive(Debug, Default)]
struct Store {
    items: HashMap<String, CacheItem<LinkMetadata>>,
    next_seq: u64,
}

/// Cache of resolved metadata. Values are cloned on the way in and out.
#[derive(Debug)]
pub struct MetadataCache {
    ttl: Duration,
    max_items: usize,
    store: Mutex<Store>,
}

/// Trim and lower-case the whole URL string.
pub fn normalize_key(url: &str) -> String {
    url.trim().to_lowercase()
}

impl MetadataCache {
    pub fn new(opts: CacheOptions) -> Self {
        Self {
            ttl: opts.ttl,
            max_items: opts.max_items,
            store: Mutex::new(Store::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|e| Error::cache(format!("cache lock poisoned: {}", e)))
    }

    /// Return a copy of the live entry for `url`, removing it if it has expired.
    pub fn get(&self, url: &str) -> Result<Option<LinkMetadata>> {
        let key = normalize_key(url);
        let mut store = self.lock()?;

        let expired = match store.items.get(&key) {
            None => return Ok(None),
            Some(item) => item.is_expired(Instant::now()),
        };

        if expired {
            debug!(key = %key, "cache entry expired");
            store.items.remove(&key);
            return Ok(None);
        }

        Ok(store.items.get(&key).map(|item| item.data.clone()))
    }

    /// True if an unexpired entry exists. Never removes anything.
    pub fn contains(&self, url: &str) -> Result<bool> {
        let key = normalize_key(url);
        let store = self.lock()?;
        Ok(store
            .items
            .get(&key)
            .map_or(false, |item| !item.is_expired(Instant::now())))
    }

    /// Store a copy of `metadata` under `url`, then evict the oldest entry if over capacity.
    pub fn set(&self, url: &str, metadata: &LinkMetadata) -> Result<()> {
        let key = normalize_key(url);
        let now = Instant::now();
        let expires_at = now
            .checked_add(self.ttl)
            .ok_or_else(|| Error::cache(format!("ttl {:?} overflows the clock", self.ttl)))?;

        let mut store = self.lock()?;
        let seq = store.next_seq;
        store.next_seq += 1;
        store.items.insert(
            key,
            CacheItem {
                data: metadata.clone(),
                created_at: now,
                expires_at,
                seq,
            },
        );

        if store.items.len() > self.max_items {
            let oldest = store
                .items
                .iter()
                .min_by_key(|(_, item)| (item.created_at, item.seq))
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                debug!(key = %oldest, "evicting oldest cache entry");
                store.items.remove(&oldest);
            }
        }

        Ok(())
    }

    pub fn delete(&self, url: &str) -> Result<()> {
        let key = normalize_key(url);
        self.lock()?.items.remove(&key);
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.lock()?.items.clear();
        Ok(())
    }

    /// Entry count and keys, including expired entries not yet collected.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let store = self.lock()?;
        let mut entries: Vec<(&String, &CacheItem<LinkMetadata>)> = store.items.iter().collect();
        entries.sort_by_key(|(_, item)| (item.created_at, item.seq));
        Ok(CacheStats {
            size: entries.len(),
            keys: entries.into_iter().map(|(k, _)| k.clone()).collect(),
        })
    }
}

impl Default for MetadataCache {
    fn default() -> Self {
        Self::new(CacheOptions::default())
    }
}
