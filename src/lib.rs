//! # Lockstep
//!
//! A simulator of strict two-phase locking (S2PL) concurrency control: a
//! fixed-size in-memory store of integer slots, scripted transactions, a
//! shared/exclusive lock manager, a random interleaving scheduler, and
//! wait-for-graph deadlock detection.
//!
//! ## Quick Start
//!
//! ```
//! use lockstep::prelude::*;
//!
//! let t0 = parse_script("N 1\nR 0 0\nA 0 5\nW 0 0\n")?;
//! let t1 = parse_script("N 1\nR 1 0\nW 0 1\n")?;
//!
//! let config = SchedulerConfig { seed: Some(7), ..Default::default() };
//! let report = Scheduler::new(Store::zeroed(2), vec![t0, t1], config).run();
//!
//! for event in &report.events {
//!     println!("{event}");
//! }
//! println!("final store: {:?}", report.final_store);
//! # lockstep::Result::Ok(())
//! ```
//!
//! ## Pieces
//!
//! - [`Store`] — the shared register file; no locking of its own
//! - [`LockManager`] — S/X grants, upgrades, release-all
//! - [`Transaction`] — local registers plus a FIFO command queue
//! - [`Scheduler`] — interleaved execution, block-on-denial retry,
//!   deadlock policy
//! - [`WaitForGraph`] — cycle detection over blocked transactions

#![warn(missing_docs)]

pub mod prelude;

pub use lockstep_concurrency::{LockManager, WaitForGraph};
pub use lockstep_core::{Command, Error, ItemId, LockMode, Result, TxnId};
pub use lockstep_engine::{
    load_script, parse_script, DeadlockPolicy, Event, RunOutcome, RunReport, Scheduler,
    SchedulerConfig, Script, Transaction,
};
pub use lockstep_storage::Store;
