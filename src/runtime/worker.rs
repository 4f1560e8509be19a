//! Worker threads
//!
//! Each asynchronous launch spawns one OS thread that runs the queued
//! callable and publishes its result into the shared future cell. Workers
//! carry no scheduling state of their own; join bookkeeping lives on the
//! cell they resolve.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::trace;

use crate::runtime::future::FutureCell;

/// The callable an asynchronous launch evaluates.
///
/// A first-class value rather than a bare function pointer, so closures
/// with captured state work the same as generated top-level functions.
pub type TaskFn = Box<dyn FnOnce(i64) -> i64 + Send + 'static>;

/// Everything one worker needs: the callable, its argument and the cell to
/// resolve. Consumed by exactly one worker and dropped when it finishes.
pub struct TaskBundle {
    /// The function to evaluate.
    pub callable: TaskFn,
    /// Its single integer argument.
    pub argument: i64,
    /// The cell that receives the result.
    pub cell: Arc<FutureCell>,
}

/// Worker body: evaluate the callable, publish the result, terminate.
///
/// Errors inside the callable are not observed; if it never returns, the
/// cell stays unresolved and any get on it blocks forever.
pub fn run_task(bundle: TaskBundle) {
    let TaskBundle {
        callable,
        argument,
        cell,
    } = bundle;
    let value = callable(argument);
    trace!("{} computed {}", cell.id(), value);
    cell.resolve(value).expect("future resolved twice");
}

/// Spawn the worker thread for a bundle.
///
/// The thread is named after the future it resolves. Spawn failure is
/// surfaced to the launcher; it cannot be recovered from.
pub fn spawn_worker(
    bundle: TaskBundle,
    stack_size: usize,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("future-worker-{}", bundle.cell.id().value()))
        .stack_size(stack_size)
        .spawn(move || run_task(bundle))
}
