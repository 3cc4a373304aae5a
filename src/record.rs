use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// A key together with its cumulative weight.
///
/// `Ord` is the base ascending order: lesser count first, ties broken by the
/// lesser key. Top-K results use the strict reverse of it, see [`descending`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrequencyRecord<K> {
    pub key: K,
    pub count: u64,
}

impl<K> FrequencyRecord<K> {
    pub fn new(key: K, count: u64) -> Self {
        Self { key, count }
    }
}

impl<K: Ord> PartialOrd for FrequencyRecord<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for FrequencyRecord<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl<K: fmt::Display> fmt::Display for FrequencyRecord<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.key, self.count)
    }
}

impl<K> From<(K, u64)> for FrequencyRecord<K> {
    fn from((key, count): (K, u64)) -> Self {
        Self { key, count }
    }
}

/// Top-K order: greater count first, then greater key first.
pub fn descending<K: Ord>(a: &FrequencyRecord<K>, b: &FrequencyRecord<K>) -> Ordering {
    b.cmp(a)
}

/// An immutable, ordered Top-K view handed out by a tracker.
///
/// Clones share the same allocation. Use [`TopKSnapshot::to_vec`] (via the
/// slice) for an owned copy; nothing done to a copy reaches the tracker.
#[derive(Debug, PartialEq, Eq)]
pub struct TopKSnapshot<K> {
    records: Arc<[FrequencyRecord<K>]>,
}

// Not derived: a clone only bumps the refcount, so `K` need not be `Clone`.
impl<K> Clone for TopKSnapshot<K> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<K> TopKSnapshot<K> {
    /// Wraps records that are already in Top-K order.
    pub(crate) fn from_sorted(records: Vec<FrequencyRecord<K>>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn empty() -> Self {
        Self::from_sorted(Vec::new())
    }

    pub fn records(&self) -> &[FrequencyRecord<K>] {
        &self.records
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.records.iter().map(|record| &record.key)
    }

    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.records.iter().map(|record| record.count)
    }

    /// The lowest record kept, i.e. the K-th entry when the view is full.
    pub fn boundary(&self) -> Option<&FrequencyRecord<K>> {
        self.records.last()
    }

    /// Whether `other` is the very same allocation, not merely equal content.
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }
}

impl<K> Default for TopKSnapshot<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K> Deref for TopKSnapshot<K> {
    type Target = [FrequencyRecord<K>];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl<'a, K> IntoIterator for &'a TopKSnapshot<K> {
    type Item = &'a FrequencyRecord<K>;
    type IntoIter = std::slice::Iter<'a, FrequencyRecord<K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<K: PartialEq> PartialEq<[FrequencyRecord<K>]> for TopKSnapshot<K> {
    fn eq(&self, other: &[FrequencyRecord<K>]) -> bool {
        *self.records == *other
    }
}

impl<K: PartialEq> PartialEq<Vec<FrequencyRecord<K>>> for TopKSnapshot<K> {
    fn eq(&self, other: &Vec<FrequencyRecord<K>>) -> bool {
        *self.records == other[..]
    }
}
