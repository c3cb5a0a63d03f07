//! The observable trace of a run.
//!
//! Every scheduling decision that matters — lock grants and denials,
//! executed commands, completions, aborts, deadlock declarations — becomes
//! one [`Event`]. The CLI renders them as human lines or serializes the
//! whole [`RunReport`] as JSON. Event lines are diagnostics, not a stable
//! API.

use lockstep_core::{Command, ItemId, LockMode, TxnId};
use serde::Serialize;

/// One observable step of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A lock request was granted.
    LockGranted {
        /// Requesting transaction.
        txn: TxnId,
        /// Target item.
        item: ItemId,
        /// Requested mode.
        mode: LockMode,
    },
    /// A lock request was denied; the command stays queued for retry.
    LockDenied {
        /// Requesting transaction.
        txn: TxnId,
        /// Target item.
        item: ItemId,
        /// Requested mode.
        mode: LockMode,
    },
    /// A command executed and was popped from its queue.
    Executed {
        /// Executing transaction.
        txn: TxnId,
        /// The command that ran.
        command: Command,
    },
    /// A `P` command dumped the store.
    StoreDump {
        /// Requesting transaction.
        txn: TxnId,
        /// Store contents at the time of the dump.
        slots: Vec<i64>,
    },
    /// A transaction drained its queue; all of its locks were released.
    TxnFinished {
        /// The finished transaction.
        txn: TxnId,
        /// How many locks the release removed.
        released: usize,
    },
    /// A transaction hit a fatal error and was removed from scheduling.
    TxnAborted {
        /// The aborted transaction.
        txn: TxnId,
        /// Why it was aborted.
        reason: String,
        /// How many locks the release removed.
        released: usize,
    },
    /// The wait-for graph contains a cycle.
    DeadlockDetected {
        /// The transactions on the cycle, in wait order.
        cycle: Vec<TxnId>,
    },
    /// A deadlock victim was aborted so the rest of the run can continue.
    VictimAborted {
        /// The victim.
        txn: TxnId,
        /// How many locks the release removed.
        released: usize,
    },
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::LockGranted { txn, item, mode } => {
                write!(f, "{txn} {mode} lock on {item}: granted")
            }
            Event::LockDenied { txn, item, mode } => {
                write!(f, "{txn} {mode} lock on {item}: denied")
            }
            Event::Executed { txn, command } => write!(f, "{txn} executes {command}"),
            Event::StoreDump { txn, slots } => write!(f, "{txn} dumps store {slots:?}"),
            Event::TxnFinished { txn, released } => {
                write!(f, "{txn} finished, released {released} lock(s)")
            }
            Event::TxnAborted { txn, reason, released } => {
                write!(f, "{txn} aborted ({reason}), released {released} lock(s)")
            }
            Event::DeadlockDetected { cycle } => {
                write!(f, "deadlock detected:")?;
                for txn in cycle {
                    write!(f, " {txn} ->")?;
                }
                match cycle.first() {
                    Some(first) => write!(f, " {first}"),
                    None => Ok(()),
                }
            }
            Event::VictimAborted { txn, released } => {
                write!(f, "{txn} aborted as deadlock victim, released {released} lock(s)")
            }
        }
    }
}

/// Overall result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every transaction finished or was individually aborted.
    Completed,
    /// A deadlock was declared under [`crate::DeadlockPolicy::Halt`] and the
    /// run stopped.
    Deadlock,
}

/// Everything a run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// The ordered event trace.
    pub events: Vec<Event>,
    /// Transactions that were aborted (errors or deadlock victims).
    pub aborted: Vec<TxnId>,
    /// Store contents when the run stopped.
    pub final_store: Vec<i64>,
}

impl RunReport {
    /// Count of denial events in the trace.
    pub fn denials(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::LockDenied { .. }))
            .count()
    }

    /// Whether a deadlock was ever declared during the run.
    pub fn saw_deadlock(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, Event::DeadlockDetected { .. }))
    }
}
