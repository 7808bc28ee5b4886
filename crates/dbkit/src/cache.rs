//! SELECT result caching.
//!
//! A connection may expose a [`ResultCache`]; statements marked with
//! `cached(lifetime)` store their rows there and later executions of the same
//! SQL on the same connection are answered from it.

use crate::result::Row;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Key under which the rows of `sql` executed on connection `name` are cached.
pub fn cache_key(name: &str, sql: &str) -> String {
    format!("Database::query(\"{name}\", \"{sql}\")")
}

/// Storage for cached result rows.
pub trait ResultCache: Send + Sync {
    /// Fetch unexpired rows for `key`.
    fn get(&self, key: &str) -> Option<Vec<Row>>;

    /// Store rows for `lifetime`.
    fn set(&self, key: &str, rows: Vec<Row>, lifetime: Duration);

    /// Drop an entry.
    fn remove(&self, key: &str);
}

/// In-memory LRU cache with per-entry expiry.
#[derive(Debug)]
pub struct MemoryCache {
    inner: Mutex<MemoryCacheInner>,
}

#[derive(Debug)]
struct MemoryCacheInner {
    capacity: usize,
    map: HashMap<String, Entry>,
    order: VecDeque<String>,
}

#[derive(Debug)]
struct Entry {
    rows: Vec<Row>,
    expires_at: Instant,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(MemoryCacheInner {
                capacity,
                map: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.map.clear();
        inner.order.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryCacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<Row>> {
        let mut inner = self.lock();
        if inner.map.get(key)?.expires_at <= Instant::now() {
            inner.map.remove(key);
            inner.forget(key);
            return None;
        }
        inner.promote(key);
        inner.map.get(key).map(|entry| entry.rows.clone())
    }

    fn set(&self, key: &str, rows: Vec<Row>, lifetime: Duration) {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.map.insert(
            key.to_string(),
            Entry {
                rows,
                expires_at: now + lifetime,
            },
        );
        inner.promote(key);
        inner.shrink(now);
    }

    fn remove(&self, key: &str) {
        let mut inner = self.lock();
        if inner.map.remove(key).is_some() {
            inner.forget(key);
        }
    }
}

impl MemoryCacheInner {
    /// Mark `key` as most recently used.
    fn promote(&mut self, key: &str) {
        self.forget(key);
        self.order.push_back(key.to_string());
    }

    fn forget(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    /// Drop expired entries, then least recently used ones over capacity.
    fn shrink(&mut self, now: Instant) {
        self.map.retain(|_, entry| entry.expires_at > now);
        let map = &self.map;
        self.order.retain(|k| map.contains_key(k));

        while self.map.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&oldest);
        }
    }
}
