//! Shared store for the lockstep simulator.
//!
//! A [`Store`] is a fixed-size register file of integers — the single shared
//! resource every transaction contends for. It performs no concurrency
//! control of its own: callers are responsible for holding the correct lock
//! (via `lockstep-concurrency`) before touching a slot.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod store;

pub use store::Store;
