use thiserror::Error;

/// Caller misuse of a tracker. Both variants are precondition violations:
/// the tracker state is left untouched when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// A tracker must keep room for at least one record.
    #[error("capacity must be at least 1, got {capacity}")]
    InvalidCapacity { capacity: usize },

    /// Counts only ever grow, so a zero increment is rejected rather than ignored.
    #[error("increment must be greater than zero")]
    NonPositiveIncrement,
}
