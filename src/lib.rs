//! Exact streaming Top-K frequency tracking.
//!
//! A tracker ingests `(key, increment)` events and can report, at any point,
//! the K keys with the largest cumulative weight without re-scanning every
//! key it has seen. Three interchangeable strategies sit behind the
//! [`FrequencyTracker`] trait:
//!
//! - [`HeapBoundedTracker`]: bounded min-heap, heap-sorted lazily on read.
//! - [`ThresholdMapTracker`]: candidate map with a tracked minimum, sorted lazily on read.
//! - [`InsertionSortedTracker`]: always-sorted list, reads only copy.
//!
//! Results are ordered by count descending, ties broken by the greater key.
//! `HeapBoundedTracker` settles ties at the last slot by arrival order instead.
//!
//! ```
//! use topk_tracker::{FrequencyTracker, Strategy, TrackerConfig};
//!
//! let mut topk = TrackerConfig::new(3)
//!     .with_strategy(Strategy::ThresholdMap)
//!     .build::<&str>()
//!     .unwrap();
//! for (word, n) in [("a", 2), ("b", 5), ("c", 1), ("d", 7), ("b", 1)] {
//!     topk.add_weighted(word, n).unwrap();
//! }
//! let top: Vec<_> = topk.top_k_descending().iter().map(|r| (r.key, r.count)).collect();
//! assert_eq!(top, vec![("d", 7), ("b", 6), ("a", 2)]);
//! ```

mod cache;
mod error;
mod heap_bounded;
mod insertion_sorted;
mod ledger;
mod priority_queue;
mod record;
mod threshold_map;
mod tracker;

pub use error::TrackerError;
pub use heap_bounded::HeapBoundedTracker;
pub use insertion_sorted::InsertionSortedTracker;
pub use ledger::Ledger;
pub use record::{descending, FrequencyRecord, TopKSnapshot};
pub use threshold_map::ThresholdMapTracker;
pub use tracker::{ingest, FrequencyTracker, IngestSummary, ParseStrategyError, Strategy, TrackerConfig};
