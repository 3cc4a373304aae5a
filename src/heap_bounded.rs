use std::hash::Hash;
use std::num::NonZeroU64;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::cache::SnapshotCache;
use crate::error::TrackerError;
use crate::ledger::Ledger;
use crate::priority_queue::IndexedMinHeap;
use crate::record::{FrequencyRecord, TopKSnapshot};
use crate::tracker::{check_capacity, FrequencyTracker, Strategy};

/// Top-K tracker backed by a bounded min-heap.
///
/// `add` is O(1) when the key cannot enter the Top-K, O(log k) when it does.
/// A read after an add heap-sorts a copy of the heap in O(k log k); repeated
/// reads return the cached snapshot.
///
/// A key is admitted to a full heap only if its count is strictly greater
/// than the eviction threshold (the heap's minimum count). When several keys
/// tie on that count, the ones that got in first keep their slots, so the
/// last entries may differ from the greater-key rule the other strategies
/// apply:
///
/// ```
/// use topk_tracker::{FrequencyTracker, HeapBoundedTracker};
///
/// let mut topk = HeapBoundedTracker::new(1).unwrap();
/// topk.add_weighted("p", 3).unwrap();
/// topk.add_weighted("q", 3).unwrap();
/// assert_eq!(topk.top_k_descending()[0].key, "p");
/// ```
pub struct HeapBoundedTracker<K> {
    ledger: Ledger<K>,
    heap: IndexedMinHeap<K>,
    eviction_threshold: u64,
    cache: SnapshotCache<K>,
    capacity: usize,
}

impl<K: Ord + Hash + Clone> HeapBoundedTracker<K> {
    pub fn new(capacity: usize) -> Result<Self, TrackerError> {
        Self::with_hasher(capacity, RandomState::new())
    }

    pub fn with_hasher(capacity: usize, hasher: RandomState) -> Result<Self, TrackerError> {
        check_capacity(capacity)?;
        debug!(capacity, strategy = %Strategy::HeapBounded, "created tracker");
        Ok(Self {
            ledger: Ledger::with_hasher(hasher.clone()),
            heap: IndexedMinHeap::with_capacity_and_hasher(capacity, hasher),
            eviction_threshold: 0,
            cache: SnapshotCache::Stale,
            capacity,
        })
    }

    /// Minimum count a key needs to exceed to enter a full heap; 0 until full.
    pub fn eviction_threshold(&self) -> u64 {
        self.eviction_threshold
    }

    fn admit(&mut self, key: K, count: u64) {
        // The key's slot was ordered by its old count.
        let repositioned = self.heap.remove(&key).is_some();
        if let Some(evicted) = self.heap.push(FrequencyRecord::new(key, count)) {
            trace!(evicted_count = evicted.count, count, "heap evicted minimum");
        } else {
            trace!(count, repositioned, len = self.heap.len(), "heap admitted key");
        }

        self.eviction_threshold = if self.heap.is_full() {
            self.heap.min().map(|record| record.count).unwrap_or(0)
        } else {
            0
        };
        self.cache.invalidate();
    }
}

impl<K: Ord + Hash + Clone> FrequencyTracker<K> for HeapBoundedTracker<K> {
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn unique_key_count(&self) -> usize {
        self.ledger.unique_keys()
    }

    fn total_weight(&self) -> u64 {
        self.ledger.total_weight()
    }

    fn count(&self, key: &K) -> Option<u64> {
        self.ledger.get(key)
    }

    fn strategy(&self) -> Strategy {
        Strategy::HeapBounded
    }

    fn add_nonzero(&mut self, key: K, increment: NonZeroU64) -> bool {
        let (count, first_seen) = self.ledger.increment(&key, increment);
        if !self.heap.is_full() || count > self.eviction_threshold {
            self.admit(key, count);
        }
        first_seen
    }

    fn top_k_descending(&mut self) -> TopKSnapshot<K> {
        let heap = &self.heap;
        self.cache.get_or_rebuild(|| {
            let records = heap.sorted_descending();
            debug!(len = records.len(), strategy = %Strategy::HeapBounded, "rebuilt top-k snapshot");
            TopKSnapshot::from_sorted(records)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(pairs: &[(&'static str, u64)]) -> Vec<FrequencyRecord<&'static str>> {
        pairs.iter().map(|&(k, c)| FrequencyRecord::new(k, c)).collect()
    }

    #[test]
    fn test_threshold_stays_zero_until_full() {
        let mut topk = HeapBoundedTracker::new(3).unwrap();
        topk.add_weighted("a", 4).unwrap();
        topk.add_weighted("b", 2).unwrap();
        assert_eq!(topk.eviction_threshold(), 0);

        topk.add_weighted("c", 5).unwrap();
        assert_eq!(topk.eviction_threshold(), 2);

        // b grows past a: the minimum moves to a
        topk.add_weighted("b", 7).unwrap();
        assert_eq!(topk.eviction_threshold(), 4);
    }

    #[test]
    fn test_equal_count_does_not_displace() {
        let mut topk = HeapBoundedTracker::new(1).unwrap();
        assert!(topk.add_weighted("p", 3).unwrap());
        assert!(topk.add_weighted("q", 3).unwrap());
        assert_eq!(topk.top_k_descending(), records(&[("p", 3)]));

        // One more and q strictly exceeds the threshold.
        assert!(!topk.add("q"));
        assert_eq!(topk.top_k_descending(), records(&[("q", 4)]));
    }

    #[test]
    fn test_read_is_cached_until_next_add() {
        let mut topk = HeapBoundedTracker::new(2).unwrap();
        topk.add("x");
        topk.add("y");

        let first = topk.top_k_descending();
        let second = topk.top_k_descending();
        assert!(first.shares_storage_with(&second));
        assert_eq!(first, records(&[("y", 1), ("x", 1)]));

        topk.add("x");
        let third = topk.top_k_descending();
        assert!(!third.shares_storage_with(&first));
        assert_eq!(third, records(&[("x", 2), ("y", 1)]));
        assert_eq!(first, records(&[("y", 1), ("x", 1)]), "old snapshot is unaffected");
    }

    #[test]
    fn test_below_threshold_add_keeps_cache() {
        let mut topk = HeapBoundedTracker::new(1).unwrap();
        topk.add_weighted("big", 10).unwrap();
        topk.top_k_descending();
        assert!(topk.cache.is_fresh());

        topk.add("small");
        assert!(topk.cache.is_fresh());
        assert_eq!(topk.unique_key_count(), 2);
        assert_eq!(topk.total_weight(), 11);
    }

    #[test]
    fn test_ledger_keeps_evicted_keys() {
        let mut topk = HeapBoundedTracker::new(2).unwrap();
        for i in 0..50u64 {
            topk.add_weighted(i, i + 1).unwrap();
        }
        assert_eq!(topk.unique_key_count(), 50);
        assert_eq!(topk.count(&0), Some(1));
        assert_eq!(topk.total_weight(), (1..=50).sum::<u64>());

        let top: Vec<_> = topk.top_k_descending().keys().copied().collect();
        assert_eq!(top, vec![49, 48]);
    }
}
