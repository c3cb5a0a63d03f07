//! Lock management for the lockstep simulator.
//!
//! This crate implements strict two-phase locking over store items:
//! - [`LockManager`]: grants and denies S/X lock requests, releases a
//!   transaction's locks as one unit
//! - [`WaitForGraph`]: cycle detection over blocked transactions for
//!   deadlock declaration
//!
//! The lock table and the per-transaction lock sets are exact mirrors of
//! each other and are mutated together under one mutex, so no observer can
//! see one updated without the other.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod deadlock;
mod manager;
mod table;

pub use deadlock::WaitForGraph;
pub use manager::LockManager;
