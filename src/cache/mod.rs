use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde_json::Value;

/// Composite identifier for one cached read: entity, account scope, then
/// every option that affects filtering. Distinct parameter combinations
/// never share a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    entity: &'static str,
    account_id: String,
    params: Vec<String>,
}

impl CacheKey {
    pub fn new(entity: &'static str, account_id: impl Into<String>) -> Self {
        Self {
            entity,
            account_id: account_id.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: impl ToString) -> Self {
        self.params.push(param.to_string());
        self
    }

    pub fn entity(&self) -> &str {
        self.entity
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    fn matches_prefix(&self, entity: &str, account_id: &str) -> bool {
        self.entity == entity && self.account_id == account_id
    }
}

#[derive(Debug, Default)]
struct CacheEntry {
    value: Option<(Value, Instant)>,
    generation: u64,
}

/// Read cache with explicit invalidation.
///
/// Stale in-flight protection is generation-based: a fetch records the
/// entry's generation before going to the network ([`QueryCache::begin`])
/// and its result is committed only if the generation is unchanged
/// ([`QueryCache::commit`]). Invalidation bumps the generation, so a
/// superseded response is discarded instead of overwriting newer state.
pub struct QueryCache {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh cached value for the key, if any.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let (value, stored_at) = entries.get(key)?.value.as_ref()?;
        if stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(value.clone())
    }

    /// Record the start of a fetch for this key; returns the generation
    /// token to present at commit time.
    pub fn begin(&self, key: &CacheKey) -> u64 {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.entry(key.clone()).or_default().generation
    }

    /// Commit a fetched value. Returns false (and stores nothing) when the
    /// entry was invalidated after the fetch began.
    pub fn commit(&self, key: &CacheKey, generation: u64, value: Value) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let entry = entries.entry(key.clone()).or_default();
        if entry.generation != generation {
            return false;
        }
        entry.value = Some((value, Instant::now()));
        true
    }

    /// Drop the one entry for this exact key.
    pub fn invalidate(&self, key: &CacheKey) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.get_mut(key) {
            entry.value = None;
            entry.generation += 1;
        }
    }

    /// Drop every entry whose key shares the (entity, account) prefix.
    /// Returns how many entries were invalidated.
    pub fn invalidate_prefix(&self, entity: &str, account_id: &str) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut dropped = 0;
        for (key, entry) in entries.iter_mut() {
            if key.matches_prefix(entity, account_id) {
                entry.value = None;
                entry.generation += 1;
                dropped += 1;
            }
        }
        dropped
    }
}
