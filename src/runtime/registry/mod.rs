//! Future registry
//!
//! Process-wide collection of every live future, used by teardown to find
//! and reclaim futures whose handles the program discarded. Handles are
//! opaque slot indices rather than pointers; freed slots are never reused,
//! so a stale handle is always detected instead of aliasing a new future.

use std::sync::{Arc, Mutex};

use crate::runtime::future::{FutureCell, FutureIdGenerator};
use crate::runtime::RuntimeError;

/// Opaque handle to a registered future.
///
/// This is the value generated programs hold between an asynchronous launch
/// and the matching get. It is a plain index into the registry and stays
/// valid until the future is freed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FutureHandle(pub(crate) usize);

impl FutureHandle {
    /// Get the inner slot index.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for FutureHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FutureHandle({})", self.0)
    }
}

/// Registry configuration.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of live futures. Creation past this bound fails with
    /// [`RuntimeError::RegistryFull`]; the bound counts futures not yet
    /// freed, not futures ever created.
    pub max_futures: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { max_futures: 1024 }
    }
}

/// Slot table guarded by the registry mutex.
#[derive(Debug, Default)]
struct SlotTable {
    /// Freed entries stay `None` so indices are never reused.
    entries: Vec<Option<Arc<FutureCell>>>,
    /// Count of `Some` entries, kept in step with every mutation.
    live: usize,
}

/// Process-wide registry of live futures.
///
/// Appended to on every future creation and drained exactly once by
/// teardown. All mutation happens under the slot mutex; the registry is
/// shared between launching and tearing-down contexts.
#[derive(Debug)]
pub struct FutureRegistry {
    /// Slot table.
    slots: Mutex<SlotTable>,
    /// Generator for diagnostic ids.
    ids: FutureIdGenerator,
    /// Configuration.
    config: RegistryConfig,
}

impl FutureRegistry {
    /// Create an empty registry with default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with custom configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            slots: Mutex::new(SlotTable::default()),
            ids: FutureIdGenerator::new(),
            config,
        }
    }

    /// Get the configured live-future capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.max_futures
    }

    /// Number of live (not yet freed) futures.
    #[inline]
    pub fn live(&self) -> usize {
        self.slots.lock().unwrap().live
    }

    /// Check if no live futures remain.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live() == 0
    }

    /// Allocate and register a fresh, unresolved future.
    ///
    /// Fails with [`RuntimeError::RegistryFull`] when the live-future bound
    /// is reached.
    pub fn insert(&self) -> Result<(FutureHandle, Arc<FutureCell>), RuntimeError> {
        let mut slots = self.slots.lock().unwrap();
        if slots.live >= self.config.max_futures {
            return Err(RuntimeError::RegistryFull {
                capacity: self.config.max_futures,
            });
        }
        let cell = Arc::new(FutureCell::new(self.ids.generate()));
        let handle = FutureHandle(slots.entries.len());
        slots.entries.push(Some(cell.clone()));
        slots.live += 1;
        Ok((handle, cell))
    }

    /// Look up a live future by handle.
    pub fn get(&self, handle: FutureHandle) -> Result<Arc<FutureCell>, RuntimeError> {
        let slots = self.slots.lock().unwrap();
        match slots.entries.get(handle.0) {
            Some(Some(cell)) => Ok(cell.clone()),
            Some(None) => Err(RuntimeError::HandleFreed(handle)),
            None => Err(RuntimeError::UnknownHandle(handle)),
        }
    }

    /// Remove a future from the registry, returning its cell.
    ///
    /// The handle is dead afterwards; using it again reports
    /// [`RuntimeError::HandleFreed`].
    pub fn release(&self, handle: FutureHandle) -> Result<Arc<FutureCell>, RuntimeError> {
        let mut slots = self.slots.lock().unwrap();
        let slot = slots
            .entries
            .get_mut(handle.0)
            .ok_or(RuntimeError::UnknownHandle(handle))?;
        let cell = slot.take().ok_or(RuntimeError::HandleFreed(handle))?;
        slots.live -= 1;
        Ok(cell)
    }

    /// Remove and return every live future, emptying the registry.
    ///
    /// Insertion order is preserved and slot indices stay retired, so
    /// handles from before the drain remain detectably dead. Used by
    /// teardown; safe to call on an already-empty registry.
    pub fn drain(&self) -> Vec<Arc<FutureCell>> {
        let mut slots = self.slots.lock().unwrap();
        slots.live = 0;
        slots
            .entries
            .iter_mut()
            .filter_map(|slot| slot.take())
            .collect()
    }

    /// Number of futures ever created in this registry.
    #[inline]
    pub fn created(&self) -> usize {
        self.slots.lock().unwrap().entries.len()
    }
}

impl Default for FutureRegistry {
    fn default() -> Self {
        Self::new()
    }
}
