//! Shared future state
//!
//! A [`FutureCell`] is the object an asynchronous call and its caller share:
//! the worker publishes exactly one value into it, the caller blocks on it
//! until that value is available. Resolution is monotonic: once a cell
//! holds a value it never becomes empty again.

use std::fmt;
use std::sync::{Condvar, Mutex};
use std::thread::JoinHandle;

use super::future_id::FutureId;
use crate::runtime::RuntimeError;

/// Shared state of one asynchronous call.
///
/// The cell is owned jointly (via `Arc`) by the registry and by the worker
/// that resolves it. The value slot is guarded by a mutex paired with a
/// condition variable, so any context that observes the cell as resolved
/// also observes the published value.
pub struct FutureCell {
    /// Diagnostic id, unique per process.
    id: FutureId,
    /// `None` until resolved, then `Some(value)` forever.
    value: Mutex<Option<i64>>,
    /// Signalled once when the value is published.
    on_resolve: Condvar,
    /// Join handle of the worker; `take()`n by the first joiner.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for FutureCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FutureCell")
            .field("id", &self.id)
            .field("value", &self.try_value())
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

impl FutureCell {
    /// Create a fresh, unresolved cell with no worker attached.
    pub fn new(id: FutureId) -> Self {
        Self {
            id,
            value: Mutex::new(None),
            on_resolve: Condvar::new(),
            worker: Mutex::new(None),
        }
    }

    /// Get the cell's id.
    #[inline]
    pub fn id(&self) -> FutureId {
        self.id
    }

    /// Check whether the cell has been resolved.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.value.lock().unwrap().is_some()
    }

    /// Read the value without blocking, if already resolved.
    #[inline]
    pub fn try_value(&self) -> Option<i64> {
        *self.value.lock().unwrap()
    }

    /// Publish the result of the asynchronous call.
    ///
    /// May be called at most once per cell; a second call is a programming
    /// error inside the runtime and is reported, never silently absorbed.
    pub fn resolve(&self, value: i64) -> Result<(), RuntimeError> {
        let mut slot = self.value.lock().unwrap();
        if slot.is_some() {
            return Err(RuntimeError::AlreadyResolved(self.id));
        }
        *slot = Some(value);
        drop(slot);
        self.on_resolve.notify_all();
        Ok(())
    }

    /// Block until the cell is resolved and return its value.
    ///
    /// If the callable backing this cell never terminates, this waits
    /// forever; there is no timeout.
    pub fn wait_value(&self) -> i64 {
        let mut slot = self.value.lock().unwrap();
        while slot.is_none() {
            slot = self.on_resolve.wait(slot).unwrap();
        }
        slot.unwrap()
    }

    /// Attach the join handle of the worker resolving this cell.
    pub fn attach_worker(&self, handle: JoinHandle<()>) {
        let mut worker = self.worker.lock().unwrap();
        debug_assert!(worker.is_none(), "worker attached twice");
        *worker = Some(handle);
    }

    /// Wait for the worker to fully terminate.
    ///
    /// Only the first caller actually joins; later callers (a repeated get,
    /// or teardown after an explicit get) find the handle already taken and
    /// return immediately. A cell that never had a worker is a no-op too.
    pub fn join_worker(&self) {
        let handle = self.worker.lock().unwrap().take();
        if let Some(handle) = handle {
            handle.join().expect("worker thread panicked");
        }
    }

    /// Check whether a worker is attached and not yet joined.
    #[inline]
    pub fn has_worker(&self) -> bool {
        self.worker.lock().unwrap().is_some()
    }
}

impl fmt::Display for FutureCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_value() {
            Some(value) => write!(f, "{}: resolved, value = {}", self.id, value),
            None => write!(f, "{}: unresolved", self.id),
        }
    }
}
