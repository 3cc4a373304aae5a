use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroU64;

use ahash::RandomState;

/// Full-history key -> cumulative weight map.
///
/// Entries are created on the first increment of a key and never removed.
/// Only the auxiliary Top-K structures of the trackers are bounded; the
/// ledger grows with every new distinct key.
#[derive(Debug, Clone)]
pub struct Ledger<K> {
    counts: HashMap<K, u64, RandomState>,
    total_weight: u64,
}

impl<K: Hash + Eq + Clone> Ledger<K> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_hasher(hasher: RandomState) -> Self {
        Self {
            counts: HashMap::with_hasher(hasher),
            total_weight: 0,
        }
    }

    /// Adds `increment` to `key` and returns `(new_count, first_seen)`.
    ///
    /// The key is only cloned when it is seen for the first time.
    pub fn increment(&mut self, key: &K, increment: NonZeroU64) -> (u64, bool) {
        let increment = increment.get();
        self.total_weight += increment;
        if let Some(count) = self.counts.get_mut(key) {
            *count += increment;
            return (*count, false);
        }
        self.counts.insert(key.clone(), increment);
        (increment, true)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(key).copied()
    }

    pub fn unique_keys(&self) -> usize {
        self.counts.len()
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(key, count)| (key, *count))
    }
}

impl<K: Hash + Eq + Clone> Default for Ledger<K> {
    fn default() -> Self {
        Self::new()
    }
}
