use crate::record::TopKSnapshot;

/// Lazily rebuilt Top-K view.
///
/// A `Stale` cache must be rebuilt before anything is returned to a caller;
/// [`SnapshotCache::get_or_rebuild`] is the only way to read it.
#[derive(Debug)]
pub(crate) enum SnapshotCache<K> {
    Stale,
    Fresh(TopKSnapshot<K>),
}

impl<K> SnapshotCache<K> {
    pub(crate) fn invalidate(&mut self) {
        *self = SnapshotCache::Stale;
    }

    #[cfg(test)]
    pub(crate) fn is_fresh(&self) -> bool {
        matches!(self, SnapshotCache::Fresh(_))
    }

    /// Returns the cached view, running `rebuild` first if the cache is stale.
    pub(crate) fn get_or_rebuild<F>(&mut self, rebuild: F) -> TopKSnapshot<K>
    where
        F: FnOnce() -> TopKSnapshot<K>,
    {
        match self {
            SnapshotCache::Fresh(snapshot) => snapshot.clone(),
            SnapshotCache::Stale => {
                let snapshot = rebuild();
                *self = SnapshotCache::Fresh(snapshot.clone());
                snapshot
            }
        }
    }
}

impl<K> Default for SnapshotCache<K> {
    fn default() -> Self {
        SnapshotCache::Stale
    }
}
