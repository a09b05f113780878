//! Per-record thumbnail cache.
//!
//! A lookup result is stored once, positive or negative, and reused for the
//! life of the session. Entries are never evicted.

use std::collections::HashMap;

/// Outcome of a thumbnail lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumb {
    Found(String),
    Missing,
}

impl Thumb {
    pub fn url(&self) -> Option<&str> {
        match self {
            Thumb::Found(u) => Some(u),
            Thumb::Missing => None,
        }
    }
}

impl From<Option<String>> for Thumb {
    fn from(v: Option<String>) -> Self {
        match v {
            Some(u) if !u.is_empty() => Thumb::Found(u),
            _ => Thumb::Missing,
        }
    }
}

#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, Thumb>,
    hits: u64,
    misses: u64,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached outcome for a record id, counting the hit or miss.
    pub fn lookup(&mut self, id: &str) -> Option<&Thumb> {
        match self.entries.get(id) {
            Some(t) => {
                log::debug!("Thumb cache HIT: {}", id);
                self.hits += 1;
                Some(t)
            }
            None => {
                log::debug!("Thumb cache MISS: {}", id);
                self.misses += 1;
                None
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Store an outcome. Existing entries are kept.
    pub fn insert(&mut self, id: impl Into<String>, thumb: Thumb) {
        self.entries.entry(id.into()).or_insert(thumb);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}
