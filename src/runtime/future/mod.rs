//! Future objects
//!
//! This module provides the data model for one asynchronous call:
//!
//! - [`FutureId`](future_id::FutureId) - Process-unique diagnostic id
//! - [`FutureIdGenerator`](future_id::FutureIdGenerator) - Thread-safe id generator
//! - [`FutureCell`](cell::FutureCell) - Shared resolve-once value slot

pub mod cell;
pub mod future_id;

pub use cell::FutureCell;
pub use future_id::{FutureId, FutureIdGenerator};
