//! Future IDs
//!
//! Diagnostic identifiers for futures. An id is unique for the lifetime of
//! the process and appears in worker thread names, debug prints and log
//! events; lookup always goes through registry handles, never through ids.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// A process-unique identifier for a future.
///
/// Ids are generated atomically so concurrent launches never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FutureId(pub u64);

impl FutureId {
    /// Create a FutureId with the given value.
    #[inline]
    pub fn new(value: u64) -> Self {
        FutureId(value)
    }

    /// Returns the inner value of the id.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FutureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Future({})", self.0)
    }
}

/// Generator for unique future ids.
///
/// Thread-safe; every call to [`generate`](FutureIdGenerator::generate)
/// returns a fresh id.
#[derive(Debug, Default)]
pub struct FutureIdGenerator {
    next_id: AtomicU64,
}

impl FutureIdGenerator {
    /// Create a new id generator starting at zero.
    #[inline]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
        }
    }

    /// Generate the next unique id.
    #[inline]
    pub fn generate(&self) -> FutureId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        FutureId(id)
    }
}
