//! futurelib
//!
//! A future/promise runtime backing the asynchronous function call
//! primitive of a small teaching compiler. An `async` call spawns a worker
//! thread that evaluates a unary integer function; the caller blocks on the
//! returned future to retrieve the value, and a single end-of-run teardown
//! joins every worker and reclaims every future.
//!
//! # Example
//!
//! ```rust
//! use futurelib::runtime::FutureRuntime;
//!
//! let rt = FutureRuntime::new();
//! let f = rt.async_launch(|x| x * x, 12).unwrap();
//! assert_eq!(rt.get(f).unwrap(), 144);
//! rt.teardown();
//! ```

#![doc(html_root_url = "https://docs.rs/futurelib")]
#![warn(rust_2018_idioms)]

// Public modules
pub mod abi;
pub mod runtime;

// Utility modules
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};
pub use thiserror::Error;

pub use runtime::{FutureHandle, FutureRuntime, RuntimeConfig, RuntimeError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Runtime name
pub const NAME: &str = "futurelib";
