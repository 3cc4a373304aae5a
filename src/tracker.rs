use std::fmt;
use std::hash::Hash;
use std::num::NonZeroU64;
use std::str::FromStr;

use crate::error::TrackerError;
use crate::heap_bounded::HeapBoundedTracker;
use crate::insertion_sorted::InsertionSortedTracker;
use crate::record::TopKSnapshot;
use crate::threshold_map::ThresholdMapTracker;

/// Exact streaming Top-K over `(key, increment)` events.
///
/// Every implementation keeps the full-history [`Ledger`](crate::Ledger) plus
/// its own bounded view of the `capacity()` largest records. They differ only
/// in how that view is maintained, and agree on results except for which
/// keys fill the last slots when counts tie there (see [`Strategy`]).
pub trait FrequencyTracker<K> {
    /// The configured K, fixed at construction.
    fn capacity(&self) -> usize;

    /// Number of distinct keys ever added.
    fn unique_key_count(&self) -> usize;

    /// Sum of all increments ever applied.
    fn total_weight(&self) -> u64;

    /// Cumulative count of `key`, or `None` if it was never added.
    fn count(&self, key: &K) -> Option<u64>;

    fn strategy(&self) -> Strategy;

    /// Adds `increment` to `key`. Returns true iff `key` was never seen before.
    fn add_nonzero(&mut self, key: K, increment: NonZeroU64) -> bool;

    /// Current Top-K, greatest count first, ties broken by the greater key.
    ///
    /// Repeated calls without an intervening add return equal content. The
    /// snapshot is immutable; it stays valid after later adds but no longer
    /// reflects them.
    fn top_k_descending(&mut self) -> TopKSnapshot<K>;

    /// Same as `add_weighted(key, 1)`.
    fn add(&mut self, key: K) -> bool {
        self.add_nonzero(key, NonZeroU64::MIN)
    }

    /// Adds `increment` to `key`; a zero increment is rejected and leaves the
    /// tracker untouched.
    fn add_weighted(&mut self, key: K, increment: u64) -> Result<bool, TrackerError> {
        let increment = NonZeroU64::new(increment).ok_or(TrackerError::NonPositiveIncrement)?;
        Ok(self.add_nonzero(key, increment))
    }

    fn is_empty(&self) -> bool {
        self.unique_key_count() == 0
    }
}

impl<K, T: FrequencyTracker<K> + ?Sized> FrequencyTracker<K> for Box<T> {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn unique_key_count(&self) -> usize {
        (**self).unique_key_count()
    }

    fn total_weight(&self) -> u64 {
        (**self).total_weight()
    }

    fn count(&self, key: &K) -> Option<u64> {
        (**self).count(key)
    }

    fn strategy(&self) -> Strategy {
        (**self).strategy()
    }

    fn add_nonzero(&mut self, key: K, increment: NonZeroU64) -> bool {
        (**self).add_nonzero(key, increment)
    }

    fn top_k_descending(&mut self) -> TopKSnapshot<K> {
        (**self).top_k_descending()
    }
}

pub(crate) fn check_capacity(capacity: usize) -> Result<(), TrackerError> {
    if capacity == 0 {
        return Err(TrackerError::InvalidCapacity { capacity });
    }
    Ok(())
}

/// The interchangeable ways of keeping the Top-K view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Bounded min-heap with an eviction threshold, heap-sorted lazily on read.
    HeapBounded,
    /// Candidate map with a tracked minimum, sorted lazily on read.
    ThresholdMap,
    /// Always-sorted list updated on every add; reads only copy.
    #[default]
    InsertionSorted,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::HeapBounded,
        Strategy::ThresholdMap,
        Strategy::InsertionSorted,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::HeapBounded => "heap",
            Strategy::ThresholdMap => "threshold",
            Strategy::InsertionSorted => "sorted",
        }
    }

    /// Whether ties at the last slot are settled by the greater key.
    ///
    /// `HeapBounded` only admits a key whose count strictly exceeds the
    /// current minimum, so among keys tied at the boundary the earliest
    /// arrivals keep their slots.
    pub fn is_canonical_tie_break(self) -> bool {
        !matches!(self, Strategy::HeapBounded)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy `{0}`, expected one of: heap, threshold, sorted")]
pub struct ParseStrategyError(String);

impl FromStr for Strategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heap" | "heap-bounded" | "heap_bounded" => Ok(Strategy::HeapBounded),
            "threshold" | "threshold-map" | "threshold_map" => Ok(Strategy::ThresholdMap),
            "sorted" | "insertion-sorted" | "insertion_sorted" => Ok(Strategy::InsertionSorted),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

/// Construction parameters for a tracker chosen at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    pub capacity: usize,
    pub strategy: Strategy,
}

impl TrackerConfig {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            strategy: Strategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        check_capacity(self.capacity)
    }

    pub fn build<K>(&self) -> Result<Box<dyn FrequencyTracker<K>>, TrackerError>
    where
        K: Ord + Hash + Clone + 'static,
    {
        self.validate()?;
        let tracker: Box<dyn FrequencyTracker<K>> = match self.strategy {
            Strategy::HeapBounded => Box::new(HeapBoundedTracker::<K>::new(self.capacity)?),
            Strategy::ThresholdMap => Box::new(ThresholdMapTracker::<K>::new(self.capacity)?),
            Strategy::InsertionSorted => Box::new(InsertionSortedTracker::<K>::new(self.capacity)?),
        };
        Ok(tracker)
    }
}

/// What a call to [`ingest`] applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub events: usize,
    pub new_keys: usize,
    pub weight: u64,
}

/// Feeds `(key, increment)` events into `tracker` in order.
///
/// Stops at the first zero increment; events before it remain applied.
pub fn ingest<K, T, I>(tracker: &mut T, events: I) -> Result<IngestSummary, TrackerError>
where
    T: FrequencyTracker<K> + ?Sized,
    I: IntoIterator<Item = (K, u64)>,
{
    let mut summary = IngestSummary::default();
    for (key, increment) in events {
        if tracker.add_weighted(key, increment)? {
            summary.new_keys += 1;
        }
        summary.events += 1;
        summary.weight += increment;
    }
    Ok(summary)
}
