//! Future runtime
//!
//! Backing runtime for the `async` / `get` language primitives: launching a
//! call spawns a worker thread whose result lands in a shared future, and
//! retrieval blocks until that result is available.
//!
//! # Architecture
//!
//! - [`FutureCell`](future::FutureCell) - Resolve-once shared result slot
//! - [`FutureRegistry`](registry::FutureRegistry) - Process-wide table of live futures
//! - [`TaskBundle`](worker::TaskBundle) / [`run_task`](worker::run_task) - Worker execution
//! - [`FutureRuntime`] - Facade tying launch, retrieval and teardown together

pub mod future;
pub mod registry;
pub mod worker;

pub use future::{FutureCell, FutureId, FutureIdGenerator};
pub use registry::{FutureHandle, FutureRegistry, RegistryConfig};
pub use worker::{TaskBundle, TaskFn};

use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tracing::debug;

/// Errors the runtime can report.
///
/// Misuse of a handle is reported loudly rather than treated as undefined
/// behavior; resource exhaustion and spawn failure are fatal for callers
/// that have no error channel (see the `abi` module).
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The live-future bound was reached.
    #[error("future registry full: {capacity} futures already live")]
    RegistryFull { capacity: usize },

    /// The handle was never issued by this runtime.
    #[error("unknown future handle: {0}")]
    UnknownHandle(FutureHandle),

    /// The handle's future was already freed.
    #[error("future handle used after free: {0}")]
    HandleFreed(FutureHandle),

    /// A future was resolved twice (runtime-internal programming error).
    #[error("{0} resolved twice")]
    AlreadyResolved(FutureId),

    /// The worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maximum number of live futures.
    pub max_futures: usize,
    /// Stack size for worker threads.
    pub worker_stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_futures: RegistryConfig::default().max_futures,
            worker_stack_size: 2 * 1024 * 1024,
        }
    }
}

/// Runtime statistics.
#[derive(Debug, Default)]
pub struct RuntimeStats {
    /// Futures created (launched or bare).
    pub futures_created: AtomicUsize,
    /// Workers launched.
    pub workers_launched: AtomicUsize,
    /// Values retrieved through get.
    pub values_retrieved: AtomicUsize,
    /// Futures released (individually or by teardown).
    pub futures_released: AtomicUsize,
}

impl RuntimeStats {
    /// Record a created future.
    #[inline]
    pub fn record_created(&self) {
        self.futures_created.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a launched worker.
    #[inline]
    pub fn record_launched(&self) {
        self.workers_launched.fetch_add(1, Ordering::SeqCst);
    }

    /// Record a retrieval.
    #[inline]
    pub fn record_retrieved(&self) {
        self.values_retrieved.fetch_add(1, Ordering::SeqCst);
    }

    /// Record released futures.
    #[inline]
    pub fn record_released(&self, count: usize) {
        self.futures_released.fetch_add(count, Ordering::SeqCst);
    }
}

/// The future runtime facade.
///
/// One instance owns the registry of every future created through it. The
/// generated-program surface in the `abi` module wraps a process-global
/// instance; embedders and tests can hold their own.
#[derive(Debug)]
pub struct FutureRuntime {
    /// Configuration.
    config: RuntimeConfig,
    /// Registry of live futures.
    registry: FutureRegistry,
    /// Statistics.
    stats: RuntimeStats,
}

impl FutureRuntime {
    /// Create a runtime with default configuration.
    #[inline]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a runtime with custom configuration.
    pub fn with_config(config: RuntimeConfig) -> Self {
        let registry = FutureRegistry::with_config(RegistryConfig {
            max_futures: config.max_futures,
        });
        Self {
            config,
            registry,
            stats: RuntimeStats::default(),
        }
    }

    /// Allocate and register a fresh, unresolved future.
    ///
    /// The future has no worker attached; it resolves only through an
    /// explicit [`resolve`](Self::resolve) call.
    pub fn create_future(&self) -> Result<FutureHandle, RuntimeError> {
        let (handle, cell) = self.registry.insert()?;
        self.stats.record_created();
        debug!("created {} as {}", cell.id(), handle);
        Ok(handle)
    }

    /// Start an asynchronous evaluation of `callable(argument)`.
    ///
    /// Creates a future, spawns a worker thread to run the callable and
    /// returns the future's handle immediately, without waiting for the
    /// callable. Launch time is bounded regardless of how long the callable
    /// runs.
    pub fn async_launch<F>(
        &self,
        callable: F,
        argument: i64,
    ) -> Result<FutureHandle, RuntimeError>
    where
        F: FnOnce(i64) -> i64 + Send + 'static,
    {
        let (handle, cell) = self.registry.insert()?;
        self.stats.record_created();

        let bundle = TaskBundle {
            callable: Box::new(callable),
            argument,
            cell: cell.clone(),
        };
        let worker = worker::spawn_worker(bundle, self.config.worker_stack_size)?;
        cell.attach_worker(worker);
        self.stats.record_launched();

        debug!("launched {} as {} (arg {})", cell.id(), handle, argument);
        Ok(handle)
    }

    /// Publish a value into a future.
    ///
    /// Part of the runtime surface for completeness; launched futures are
    /// resolved by their workers, not through this entry point.
    pub fn resolve(&self, handle: FutureHandle, value: i64) -> Result<(), RuntimeError> {
        let cell = self.registry.get(handle)?;
        cell.resolve(value)
    }

    /// Block until the future is resolved, then return its value.
    ///
    /// After the value is available the owning worker is joined, so the
    /// worker has no further effect on shared state once this returns.
    /// Idempotent: repeated gets return the same value and never re-run the
    /// callable; only the first get actually joins. An unresolved future
    /// with a non-terminating callable blocks forever.
    pub fn get(&self, handle: FutureHandle) -> Result<i64, RuntimeError> {
        let cell = self.registry.get(handle)?;
        let value = cell.wait_value();
        cell.join_worker();
        self.stats.record_retrieved();
        Ok(value)
    }

    /// Check whether a future is resolved, without blocking.
    pub fn is_resolved(&self, handle: FutureHandle) -> Result<bool, RuntimeError> {
        Ok(self.registry.get(handle)?.is_resolved())
    }

    /// Release one future.
    ///
    /// Joins the worker first (waiting for it if still running), so no
    /// orphaned execution survives an individual free. The handle must not
    /// be used afterwards; doing so reports [`RuntimeError::HandleFreed`].
    pub fn free_future(&self, handle: FutureHandle) -> Result<(), RuntimeError> {
        let cell = self.registry.release(handle)?;
        cell.join_worker();
        self.stats.record_released(1);
        debug!("freed {}", cell.id());
        Ok(())
    }

    /// Join every outstanding worker and release every registered future.
    ///
    /// Called once at the end of a run. Futures already retrieved are
    /// joined at most once (the join bookkeeping lives on the cell), and
    /// futures created without a worker are released directly, since there
    /// is no worker to wait for. With an empty registry this is an
    /// immediate no-op.
    pub fn teardown(&self) {
        let cells = self.registry.drain();
        if cells.is_empty() {
            debug!("teardown: no futures outstanding");
            return;
        }
        let count = cells.len();
        for cell in &cells {
            cell.join_worker();
        }
        self.stats.record_released(count);
        debug!("teardown: joined and freed {} futures", count);
    }

    /// Print a future's status line for debugging. No format contract.
    pub fn debug_print(&self, handle: FutureHandle) -> Result<(), RuntimeError> {
        let cell = self.registry.get(handle)?;
        println!("{}", cell);
        Ok(())
    }

    /// Get the statistics.
    #[inline]
    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    /// Get the registry.
    #[inline]
    pub fn registry(&self) -> &FutureRegistry {
        &self.registry
    }

    /// Get the configuration.
    #[inline]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl Default for FutureRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
