use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroU64;

use ahash::RandomState;
use tracing::{debug, trace};

use crate::cache::SnapshotCache;
use crate::error::TrackerError;
use crate::ledger::Ledger;
use crate::record::{descending, FrequencyRecord, TopKSnapshot};
use crate::tracker::{check_capacity, FrequencyTracker, Strategy};

/// Top-K tracker backed by a candidate map and its tracked minimum record.
///
/// A key enters the candidates when its record outranks the current minimum
/// (or while there is room). Overflowing the capacity evicts that minimum
/// and rescans the candidates for the next one in O(k). Reads sort the
/// candidates in O(k log k) after an admission and are cached otherwise.
pub struct ThresholdMapTracker<K> {
    ledger: Ledger<K>,
    candidates: HashMap<K, u64, RandomState>,
    minimum: Option<FrequencyRecord<K>>,
    cache: SnapshotCache<K>,
    capacity: usize,
}

impl<K: Ord + Hash + Clone> ThresholdMapTracker<K> {
    pub fn new(capacity: usize) -> Result<Self, TrackerError> {
        Self::with_hasher(capacity, RandomState::new())
    }

    pub fn with_hasher(capacity: usize, hasher: RandomState) -> Result<Self, TrackerError> {
        check_capacity(capacity)?;
        debug!(capacity, strategy = %Strategy::ThresholdMap, "created tracker");
        Ok(Self {
            ledger: Ledger::with_hasher(hasher.clone()),
            candidates: HashMap::with_capacity_and_hasher(capacity + 1, hasher),
            minimum: None,
            cache: SnapshotCache::Stale,
            capacity,
        })
    }

    /// Lowest record among the candidates.
    pub fn minimum(&self) -> Option<&FrequencyRecord<K>> {
        self.minimum.as_ref()
    }

    fn admits(&self, record: &FrequencyRecord<K>) -> bool {
        self.candidates.len() < self.capacity
            || self.minimum.as_ref().map_or(true, |min| record > min)
    }

    fn admit(&mut self, record: FrequencyRecord<K>) {
        let was_minimum = self
            .minimum
            .as_ref()
            .is_some_and(|min| min.key == record.key);
        self.candidates.insert(record.key.clone(), record.count);
        self.cache.invalidate();

        if self.candidates.len() > self.capacity {
            if let Some(evicted) = self.minimum.take() {
                self.candidates.remove(&evicted.key);
                trace!(evicted_count = evicted.count, count = record.count, "candidate evicted");
            }
            self.rescan_minimum();
        } else if was_minimum {
            // The old minimum grew; some other candidate may now be lowest.
            self.rescan_minimum();
        } else if self.minimum.as_ref().map_or(true, |min| record < *min) {
            self.minimum = Some(record);
        }
    }

    fn rescan_minimum(&mut self) {
        self.minimum = self
            .candidates
            .iter()
            .min_by(|(k1, c1), (k2, c2)| c1.cmp(c2).then_with(|| k1.cmp(k2)))
            .map(|(key, &count)| FrequencyRecord::new(key.clone(), count));
        trace!(
            minimum = self.minimum.as_ref().map(|min| min.count),
            candidates = self.candidates.len(),
            "rescanned candidate minimum"
        );
    }
}

impl<K: Ord + Hash + Clone> FrequencyTracker<K> for ThresholdMapTracker<K> {
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
        Strategy::ThresholdMap
    }

    fn add_nonzero(&mut self, key: K, increment: NonZeroU64) -> bool {
        let (count, first_seen) = self.ledger.increment(&key, increment);
        let record = FrequencyRecord::new(key, count);
        if self.admits(&record) {
            self.admit(record);
        }
        first_seen
    }

    fn top_k_descending(&mut self) -> TopKSnapshot<K> {
        let candidates = &self.candidates;
        self.cache.get_or_rebuild(|| {
            let mut records: Vec<_> = candidates
                .iter()
                .map(|(key, &count)| FrequencyRecord::new(key.clone(), count))
                .collect();
            records.sort_unstable_by(descending);
            debug!(len = records.len(), strategy = %Strategy::ThresholdMap, "rebuilt top-k snapshot");
            TopKSnapshot::from_sorted(records)
        })
    }
}
