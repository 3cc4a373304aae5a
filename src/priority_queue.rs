use std::collections::HashMap;
use std::hash::Hash;

use ahash::RandomState;

use crate::record::FrequencyRecord;

/// Bounded binary min-heap of records with a key -> slot index, so a key
/// whose count changed can be pulled out in O(log k) before re-insertion.
pub(crate) struct IndexedMinHeap<K> {
    positions: HashMap<K, usize, RandomState>, // key -> heap slot
    heap: Vec<FrequencyRecord<K>>,
    capacity: usize,
}

impl<K: Ord + Clone + Hash> IndexedMinHeap<K> {
    pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: RandomState) -> Self {
        Self {
            positions: HashMap::with_capacity_and_hasher(capacity + 1, hasher),
            heap: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    pub(crate) fn min(&self) -> Option<&FrequencyRecord<K>> {
        self.heap.first()
    }

    /// Inserts `record` and, if that overflows the capacity, returns the
    /// evicted minimum. The key must not already be present.
    pub(crate) fn push(&mut self, record: FrequencyRecord<K>) -> Option<FrequencyRecord<K>> {
        debug_assert!(!self.positions.contains_key(&record.key));
        let pos = self.heap.len();
        self.positions.insert(record.key.clone(), pos);
        self.heap.push(record);
        let positions = &mut self.positions;
        sift_up(&mut self.heap, pos, |heap, i| reindex(positions, heap, i));

        if self.heap.len() > self.capacity {
            return self.pop_min();
        }
        None
    }

    pub(crate) fn pop_min(&mut self) -> Option<FrequencyRecord<K>> {
        let last = self.heap.len().checked_sub(1)?;
        self.heap.swap(0, last);
        let min = self.heap.pop()?;
        self.positions.remove(&min.key);
        if !self.heap.is_empty() {
            let positions = &mut self.positions;
            reindex(positions, &self.heap, 0);
            sift_down(&mut self.heap, 0, |heap, i| reindex(positions, heap, i));
        }
        Some(min)
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<FrequencyRecord<K>> {
        let pos = self.positions.remove(key)?;
        let last = self.heap.len() - 1;
        self.heap.swap(pos, last);
        let removed = self.heap.pop();
        if pos < self.heap.len() {
            let positions = &mut self.positions;
            reindex(positions, &self.heap, pos);
            let settled = sift_down(&mut self.heap, pos, |heap, i| reindex(positions, heap, i));
            if settled == pos {
                sift_up(&mut self.heap, pos, |heap, i| reindex(positions, heap, i));
            }
        }
        removed
    }

    /// Drains a private copy of the heap min-first, then reverses it: a
    /// heap-sort into Top-K (descending) order. The heap itself is untouched.
    pub(crate) fn sorted_descending(&self) -> Vec<FrequencyRecord<K>> {
        let mut scratch = self.heap.clone();
        let mut drained = Vec::with_capacity(scratch.len());
        while let Some(last) = scratch.len().checked_sub(1) {
            scratch.swap(0, last);
            if let Some(min) = scratch.pop() {
                drained.push(min);
            }
            sift_down(&mut scratch, 0, |_, _| {});
        }
        drained.reverse();
        drained
    }
}

fn reindex<K: Hash + Eq>(
    positions: &mut HashMap<K, usize, RandomState>,
    heap: &[FrequencyRecord<K>],
    i: usize,
) {
    if let Some(pos) = positions.get_mut(&heap[i].key) {
        *pos = i;
    }
}

// Binary heap helpers using Eytzinger layout (0-based indexing)
fn parent(i: usize) -> usize {
    (i - 1) >> 1
}
fn left(i: usize) -> usize {
    2 * i + 1
}
fn right(i: usize) -> usize {
    2 * i + 2
}

/// `moved(heap, i)` is called for each slot whose occupant changed. Both
/// helpers return the slot the sifted element settled in.
fn sift_up<T: Ord>(heap: &mut [T], mut pos: usize, mut moved: impl FnMut(&[T], usize)) -> usize {
    while pos > 0 {
        let parent = parent(pos);
        if heap[parent] > heap[pos] {
            heap.swap(parent, pos);
            moved(heap, parent);
            moved(heap, pos);
            pos = parent;
        } else {
            break;
        }
    }
    pos
}

fn sift_down<T: Ord>(heap: &mut [T], mut pos: usize, mut moved: impl FnMut(&[T], usize)) -> usize {
    loop {
        let mut smallest = pos;
        let left = left(pos);
        let right = right(pos);

        if left < heap.len() && heap[left] < heap[smallest] {
            smallest = left;
        }
        if right < heap.len() && heap[right] < heap[smallest] {
            smallest = right;
        }

        if smallest == pos {
            return pos;
        }

        heap.swap(pos, smallest);
        moved(heap, pos);
        moved(heap, smallest);
        pos = smallest;
    }
}
