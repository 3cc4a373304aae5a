use std::hash::Hash;
use std::num::NonZeroU64;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::error::TrackerError;
use crate::ledger::Ledger;
use crate::record::{FrequencyRecord, TopKSnapshot};
use crate::tracker::{check_capacity, FrequencyTracker, Strategy};

/// Top-K tracker that keeps its records in Top-K order at all times.
///
/// An add that touches the Top-K costs O(k) for the scan and shift; one that
/// cannot beat the tail of a full list is O(1). Reads copy the list and never
/// sort, so there is no cache to invalidate.
pub struct InsertionSortedTracker<K> {
    ledger: Ledger<K>,
    sorted: Vec<FrequencyRecord<K>>, // descending
    capacity: usize,
}

impl<K: Ord + Hash + Clone> InsertionSortedTracker<K> {
    pub fn new(capacity: usize) -> Result<Self, TrackerError> {
        Self::with_hasher(capacity, RandomState::new())
    }

    pub fn with_hasher(capacity: usize, hasher: RandomState) -> Result<Self, TrackerError> {
        check_capacity(capacity)?;
        debug!(capacity, strategy = %Strategy::InsertionSorted, "created tracker");
        Ok(Self {
            ledger: Ledger::with_hasher(hasher),
            sorted: Vec::with_capacity(capacity + 1),
            capacity,
        })
    }

    /// Lowest record currently kept.
    pub fn minimum(&self) -> Option<&FrequencyRecord<K>> {
        self.sorted.last()
    }

    /// Moves the record at `pos` towards the front to fit its grown count.
    fn promote(&mut self, pos: usize, record: FrequencyRecord<K>) {
        let mut target = pos;
        while target > 0 && self.sorted[target - 1] < record {
            target -= 1;
        }
        self.sorted[target..=pos].rotate_right(1);
        trace!(from = pos, to = target, count = record.count, "repositioned record");
        self.sorted[target] = record;
    }

    fn insert(&mut self, record: FrequencyRecord<K>) {
        let pos = self
            .sorted
            .iter()
            .position(|existing| *existing < record)
            .unwrap_or(self.sorted.len());
        trace!(at = pos, count = record.count, "inserted record");
        self.sorted.insert(pos, record);
        if self.sorted.len() > self.capacity {
            if let Some(dropped) = self.sorted.pop() {
                trace!(dropped_count = dropped.count, "dropped tail record");
            }
        }
    }
}

impl<K: Ord + Hash + Clone> FrequencyTracker<K> for InsertionSortedTracker<K> {
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
        Strategy::InsertionSorted
    }

    fn add_nonzero(&mut self, key: K, increment: NonZeroU64) -> bool {
        let (count, first_seen) = self.ledger.increment(&key, increment);
        let record = FrequencyRecord::new(key, count);

        let full = self.sorted.len() >= self.capacity;
        if full && self.sorted.last().is_some_and(|tail| record <= *tail) {
            return first_seen;
        }

        match self.sorted.iter().position(|existing| existing.key == record.key) {
            Some(pos) => self.promote(pos, record),
            None => self.insert(record),
        }
        first_seen
    }

    fn top_k_descending(&mut self) -> TopKSnapshot<K> {
        TopKSnapshot::from_sorted(self.sorted.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::descending;

    fn records(pairs: &[(&'static str, u64)]) -> Vec<FrequencyRecord<&'static str>> {
        pairs.iter().map(|&(k, c)| FrequencyRecord::new(k, c)).collect()
    }

    fn assert_sorted<K: Ord + std::fmt::Debug>(list: &[FrequencyRecord<K>]) {
        for pair in list.windows(2) {
            assert_eq!(descending(&pair[0], &pair[1]), std::cmp::Ordering::Less, "{:?}", pair);
        }
    }

    #[test]
    fn test_promote_moves_only_forward() {
        let mut topk = InsertionSortedTracker::new(4).unwrap();
        for (key, inc) in [("a", 8), ("b", 6), ("c", 4), ("d", 2)] {
            topk.add_weighted(key, inc).unwrap();
        }
        topk.add_weighted("d", 3).unwrap(); // 5: passes c only
        assert_eq!(topk.sorted, records(&[("a", 8), ("b", 6), ("d", 5), ("c", 4)]));

        topk.add_weighted("c", 10).unwrap(); // 14: to the front
        assert_eq!(topk.sorted, records(&[("c", 14), ("a", 8), ("b", 6), ("d", 5)]));

        topk.add("b"); // 7: stays put
        assert_eq!(topk.sorted, records(&[("c", 14), ("a", 8), ("b", 7), ("d", 5)]));
    }

    #[test]
    fn test_insert_drops_tail_when_full() {
        let mut topk = InsertionSortedTracker::new(2).unwrap();
        topk.add_weighted("a", 5).unwrap();
        topk.add_weighted("b", 3).unwrap();
        topk.add_weighted("c", 4).unwrap();
        assert_eq!(topk.sorted, records(&[("a", 5), ("c", 4)]));
        assert_eq!(topk.minimum(), Some(&FrequencyRecord::new("c", 4)));

        // Equal to the tail but a lesser key: no change.
        topk.add_weighted("b", 1).unwrap();
        assert_eq!(topk.sorted, records(&[("a", 5), ("c", 4)]));
        assert_eq!(topk.count(&"b"), Some(4));
    }

    #[test]
    fn test_stays_sorted_under_churn() {
        let mut topk = InsertionSortedTracker::new(5).unwrap();
        for i in 0..200u64 {
            let key = (i * 7919) % 23;
            topk.add_weighted(key, i % 5 + 1).unwrap();
            assert_sorted(&topk.sorted);
            assert!(topk.sorted.len() <= 5);
        }
    }
}
