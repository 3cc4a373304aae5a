#![allow(dead_code)]

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use topk_tracker::{descending, FrequencyRecord, FrequencyTracker, Strategy, TrackerConfig};

/// Drives the same events into two trackers and compares what they report.
///
/// Stats and the sequence of counts must always agree. Keys must agree
/// exactly unless one side is `HeapBounded`, in which case records tied with
/// the last (K-th) count may name different keys.
pub struct ConsistencyChecker<K> {
    left: Box<dyn FrequencyTracker<K>>,
    right: Box<dyn FrequencyTracker<K>>,
}

impl<K: Ord + Hash + Clone + Debug + 'static> ConsistencyChecker<K> {
    pub fn new(capacity: usize, left: Strategy, right: Strategy) -> Self {
        let build = |strategy: Strategy| {
            TrackerConfig::new(capacity)
                .with_strategy(strategy)
                .build::<K>()
                .expect("valid capacity")
        };
        Self {
            left: build(left),
            right: build(right),
        }
    }

    pub fn add(&mut self, key: K, increment: u64) {
        let l = self.left.add_weighted(key.clone(), increment);
        let r = self.right.add_weighted(key, increment);
        assert_eq!(l, r, "trackers disagree on add result");
    }

    pub fn feed<I: IntoIterator<Item = (K, u64)>>(&mut self, events: I) {
        for (key, increment) in events {
            self.add(key, increment);
        }
    }

    pub fn check(&mut self) -> Result<(), String> {
        let (l, r) = (&mut self.left, &mut self.right);
        if l.unique_key_count() != r.unique_key_count() {
            return Err(format!(
                "unique keys: {} vs {}",
                l.unique_key_count(),
                r.unique_key_count()
            ));
        }
        if l.total_weight() != r.total_weight() {
            return Err(format!("total weight: {} vs {}", l.total_weight(), r.total_weight()));
        }
        if l.capacity() != r.capacity() {
            return Err(format!("capacity: {} vs {}", l.capacity(), r.capacity()));
        }

        let exact = l.strategy().is_canonical_tie_break() && r.strategy().is_canonical_tie_break();
        let left = l.top_k_descending();
        let right = r.top_k_descending();
        compare_snapshots(&left, &right, exact)
    }
}

/// Compares two Top-K views of the same event sequence.
///
/// With `exact == false`, records whose count equals the boundary (last)
/// count may differ in key; everything above the boundary must be identical.
pub fn compare_snapshots<K: Ord + Debug>(
    left: &[FrequencyRecord<K>],
    right: &[FrequencyRecord<K>],
    exact: bool,
) -> Result<(), String> {
    if left.len() != right.len() {
        return Err(format!("length: {} vs {}", left.len(), right.len()));
    }
    let left_counts: Vec<u64> = left.iter().map(|r| r.count).collect();
    let right_counts: Vec<u64> = right.iter().map(|r| r.count).collect();
    if left_counts != right_counts {
        return Err(format!("counts: {:?} vs {:?}", left_counts, right_counts));
    }

    let boundary = left.last().map(|r| r.count);
    for (i, (a, b)) in left.iter().zip(right).enumerate() {
        let tied_at_boundary = !exact && Some(a.count) == boundary;
        if a != b && !tied_at_boundary {
            return Err(format!("position {}: {:?} vs {:?}", i, a, b));
        }
    }
    Ok(())
}

/// Brute-force Top-K over the full event history.
pub fn expected_top_k<K: Ord + Hash + Clone>(
    events: &[(K, u64)],
    capacity: usize,
) -> Vec<FrequencyRecord<K>> {
    let mut totals: HashMap<K, u64> = HashMap::new();
    for (key, increment) in events {
        *totals.entry(key.clone()).or_default() += increment;
    }
    let mut records: Vec<_> = totals
        .into_iter()
        .map(|(key, count)| FrequencyRecord::new(key, count))
        .collect();
    records.sort_by(descending);
    records.truncate(capacity);
    records
}

pub fn build(strategy: Strategy, capacity: usize) -> Box<dyn FrequencyTracker<&'static str>> {
    TrackerConfig::new(capacity)
        .with_strategy(strategy)
        .build()
        .expect("valid capacity")
}

pub fn pairs(snapshot: &[FrequencyRecord<&'static str>]) -> Vec<(&'static str, u64)> {
    snapshot.iter().map(|r| (r.key, r.count)).collect()
}
