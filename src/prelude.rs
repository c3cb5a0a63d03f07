//! Convenient imports for lockstep.
//!
//! ```
//! use lockstep::prelude::*;
//!
//! let script = parse_script("N 1\nP\n")?;
//! let report = Scheduler::new(Store::zeroed(1), vec![script], SchedulerConfig::default()).run();
//! assert_eq!(report.outcome, RunOutcome::Completed);
//! # lockstep::Result::Ok(())
//! ```

pub use crate::{
    load_script, parse_script, Command, DeadlockPolicy, Error, Event, ItemId, LockManager,
    LockMode, Result, RunOutcome, RunReport, Scheduler, SchedulerConfig, Script, Store,
    Transaction, TxnId, WaitForGraph,
};
