//! Execution engine for the lockstep simulator.
//!
//! Pulls the pieces together:
//! - [`Transaction`]: a command queue plus local registers
//! - [`script`]: the text format transactions are loaded from
//! - [`Scheduler`]: random interleaved execution with lock routing,
//!   block-on-denial retry, and wait-for-graph deadlock handling
//! - [`Event`] / [`RunReport`]: the observable trace of a run

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod events;
pub mod scheduler;
pub mod script;
pub mod transaction;

pub use events::{Event, RunOutcome, RunReport};
pub use scheduler::{DeadlockPolicy, Scheduler, SchedulerConfig};
pub use script::{load_script, parse_script, Script};
pub use transaction::Transaction;
