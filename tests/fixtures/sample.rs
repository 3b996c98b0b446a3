//! In-memory cache with pluggable eviction.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use crate::store::{Backend, Snapshot as Snap};

pub const MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Default)]
pub struct Cache {
    entries: HashMap<String, (Instant, Vec<u8>)>,
    ttl: Duration,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Policy {
    Lru,
    Ttl,
}

pub trait Evict {
    fn evict(&mut self, policy: Policy) -> usize;
}

impl Cache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    pub async fn refresh(&mut self, backend: &dyn Backend) -> usize {
        let snapshot: Snap = backend.snapshot().await;
        for (key, value) in snapshot.into_entries() {
            self.entries.insert(key, (Instant::now(), value));
        }
        debug!("refreshed {} entries", self.entries.len());
        self.entries.len()
    }

    fn expired(&self, at: Instant) -> bool {
        at.elapsed() > self.ttl
    }
}

pub(crate) fn internal(cache: &Cache) -> usize {
    cache.entries.len().min(MAX_ENTRIES)
}
