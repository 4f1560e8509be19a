//! Fixed call surface for generated programs
//!
//! The compiler backend emits calls against these free functions; they wrap
//! a process-global [`FutureRuntime`]. The surface is deliberately narrow
//! and stable: plain `fn(i64) -> i64` callables, opaque handles, and no
//! error channel. Misuse and resource exhaustion abort the program loudly
//! instead of corrupting state, since generated code cannot recover from
//! either.

use once_cell::sync::Lazy;
use tracing::error;

use crate::runtime::{FutureHandle, FutureRuntime, RuntimeError};

/// The process-global runtime every generated program shares.
static RUNTIME: Lazy<FutureRuntime> = Lazy::new(FutureRuntime::new);

/// Access the process-global runtime.
#[inline]
pub fn runtime() -> &'static FutureRuntime {
    &RUNTIME
}

/// Abort with the underlying runtime error.
fn fatal<T>(result: Result<T, RuntimeError>) -> T {
    result.unwrap_or_else(|err| {
        error!("{err}");
        panic!("future runtime: {err}");
    })
}

/// Allocate and register a fresh, unresolved future.
pub fn create_future() -> FutureHandle {
    fatal(runtime().create_future())
}

/// Start an asynchronous evaluation of `fun(argument)`.
///
/// Returns immediately with a handle to the eventual result.
pub fn async_call(fun: fn(i64) -> i64, argument: i64) -> FutureHandle {
    fatal(runtime().async_launch(fun, argument))
}

/// Publish a value into a future. Internal to generated code; launched
/// futures are resolved by their workers.
pub fn resolve_future(handle: FutureHandle, value: i64) {
    fatal(runtime().resolve(handle, value));
}

/// Block until the future is resolved, join its worker, return the value.
pub fn get(handle: FutureHandle) -> i64 {
    fatal(runtime().get(handle))
}

/// Release one future. The handle must not be used afterwards.
pub fn free_future(handle: FutureHandle) {
    fatal(runtime().free_future(handle));
}

/// Join every outstanding worker and release every registered future.
/// Invoked once at the end of the generated program.
pub fn free_all_futures() {
    runtime().teardown();
}

/// Print a future's id/value/resolved status. No format contract.
pub fn print_future(handle: FutureHandle) {
    fatal(runtime().debug_print(handle));
}
