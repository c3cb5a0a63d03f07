//! Interleaved execution of transactions under strict two-phase locking.
//!
//! The scheduler repeatedly picks a transaction uniformly at random among
//! those still runnable (blocked ones included), routes lock-acquiring
//! commands through the lock manager, and executes on grant. A denied
//! request leaves the command queued; the transaction is simply retried on a
//! future turn (busy-polling, no wake-on-release). Locks are held until the
//! owning transaction finishes, then released together.
//!
//! After every step the wait-for graph over blocked transactions is checked
//! for a cycle. What happens on a cycle is policy: halt the whole run, or
//! abort one victim and keep going.

use lockstep_concurrency::{LockManager, WaitForGraph};
use lockstep_core::{Command, Error, ItemId, LockMode, TxnId};
use lockstep_storage::Store;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::events::{Event, RunOutcome, RunReport};
use crate::script::Script;
use crate::transaction::Transaction;

/// What to do when the wait-for graph contains a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeadlockPolicy {
    /// Stop the whole run with [`RunOutcome::Deadlock`].
    Halt,
    /// Abort one cycle member (the youngest), release its locks, and keep
    /// scheduling everyone else.
    #[default]
    AbortVictim,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchedulerConfig {
    /// RNG seed for the interleaving. `None` seeds from the OS; a fixed
    /// seed makes the whole run reproducible.
    pub seed: Option<u64>,
    /// Deadlock handling.
    pub policy: DeadlockPolicy,
}

/// Per-transaction scheduling state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxnStatus {
    /// Has commands; eligible for selection.
    Ready,
    /// Last lock request for the front command was denied. Still eligible
    /// for selection (the retry is the poll).
    Blocked {
        /// The item the denied request targeted.
        item: ItemId,
        /// The mode it asked for. Deadlock detection needs it: only holders
        /// whose mode conflicts with this request are actually waited on.
        mode: LockMode,
    },
    /// Queue drained; locks released. Terminal.
    Finished,
    /// Removed after a fatal error or as a deadlock victim. Terminal.
    Aborted,
}

impl TxnStatus {
    fn is_terminal(self) -> bool {
        matches!(self, TxnStatus::Finished | TxnStatus::Aborted)
    }
}

/// Drives one run of interleaved transactions against a shared store.
pub struct Scheduler {
    store: Store,
    locks: LockManager,
    txns: Vec<Transaction>,
    status: Vec<TxnStatus>,
    rng: StdRng,
    policy: DeadlockPolicy,
    events: Vec<Event>,
}

impl Scheduler {
    /// Build a scheduler over `store`, one transaction per script, ids
    /// assigned in script order.
    pub fn new(store: Store, scripts: Vec<Script>, config: SchedulerConfig) -> Self {
        let txns: Vec<Transaction> = scripts
            .into_iter()
            .enumerate()
            .map(|(i, s)| Transaction::new(TxnId(i as u32), s.registers, s.commands))
            .collect();
        let status = txns
            .iter()
            .map(|t| {
                if t.finished() {
                    TxnStatus::Finished
                } else {
                    TxnStatus::Ready
                }
            })
            .collect();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Scheduler {
            locks: LockManager::new(store.len()),
            store,
            txns,
            status,
            rng,
            policy: config.policy,
            events: Vec::new(),
        }
    }

    /// Run to completion and return the trace.
    pub fn run(mut self) -> RunReport {
        let outcome = loop {
            let runnable: Vec<usize> = self
                .status
                .iter()
                .enumerate()
                .filter(|(_, s)| !s.is_terminal())
                .map(|(i, _)| i)
                .collect();
            if runnable.is_empty() {
                break RunOutcome::Completed;
            }

            let idx = runnable[self.rng.gen_range(0..runnable.len())];
            self.step(idx);

            if let Some(cycle) = self.deadlock_cycle() {
                tracing::warn!(?cycle, "deadlock declared");
                self.events.push(Event::DeadlockDetected {
                    cycle: cycle.clone(),
                });
                match self.policy {
                    DeadlockPolicy::Halt => break RunOutcome::Deadlock,
                    DeadlockPolicy::AbortVictim => self.abort_victim(&cycle),
                }
            }
        };

        let aborted = self
            .status
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == TxnStatus::Aborted)
            .map(|(i, _)| TxnId(i as u32))
            .collect();
        RunReport {
            outcome,
            events: self.events,
            aborted,
            final_store: self.store.snapshot().to_vec(),
        }
    }

    /// Give transaction `idx` one turn.
    fn step(&mut self, idx: usize) {
        let txn = self.txns[idx].id();
        let Some(cmd) = self.txns[idx].next_command().cloned() else {
            return;
        };

        match cmd.lock_intent() {
            Some((item, mode)) => match self.locks.request(txn, item, mode) {
                Ok(true) => {
                    self.events.push(Event::LockGranted { txn, item, mode });
                    self.execute(idx, cmd);
                }
                Ok(false) => {
                    self.events.push(Event::LockDenied { txn, item, mode });
                    self.status[idx] = TxnStatus::Blocked { item, mode };
                }
                Err(e) => self.abort(idx, &e),
            },
            None => self.execute(idx, cmd),
        }
    }

    /// Execute the front command of `idx` and pop it.
    fn execute(&mut self, idx: usize, cmd: Command) {
        let txn = self.txns[idx].id();
        if let Err(e) = self.txns[idx].execute(&cmd, &mut self.store) {
            self.abort(idx, &e);
            return;
        }
        self.txns[idx].pop_command();
        self.status[idx] = TxnStatus::Ready;
        if cmd == Command::Print {
            self.events.push(Event::StoreDump {
                txn,
                slots: self.store.snapshot().to_vec(),
            });
        }
        self.events.push(Event::Executed { txn, command: cmd });

        if self.txns[idx].finished() {
            let released = self.locks.release_all(txn);
            self.status[idx] = TxnStatus::Finished;
            tracing::debug!(state = %self.txns[idx], released, "transaction finished");
            self.events.push(Event::TxnFinished { txn, released });
        }
    }

    /// Abort one transaction after a fatal error; the run continues.
    fn abort(&mut self, idx: usize, error: &Error) {
        let txn = self.txns[idx].id();
        let released = self.locks.release_all(txn);
        self.status[idx] = TxnStatus::Aborted;
        tracing::warn!(%txn, %error, released, "transaction aborted");
        self.events.push(Event::TxnAborted {
            txn,
            reason: error.to_string(),
            released,
        });
    }

    /// Cycle among currently blocked transactions, if any.
    fn deadlock_cycle(&self) -> Option<Vec<TxnId>> {
        let waits: Vec<(TxnId, ItemId, LockMode)> = self
            .status
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match s {
                TxnStatus::Blocked { item, mode } => Some((TxnId(i as u32), *item, *mode)),
                _ => None,
            })
            .collect();
        if waits.len() < 2 {
            return None;
        }
        WaitForGraph::build(&waits, &self.locks).find_cycle()
    }

    /// Abort the youngest transaction on the cycle so the others can make
    /// progress.
    fn abort_victim(&mut self, cycle: &[TxnId]) {
        let Some(&victim) = cycle.iter().max() else {
            return;
        };
        let idx = victim.0 as usize;
        let released = self.locks.release_all(victim);
        self.status[idx] = TxnStatus::Aborted;
        tracing::warn!(%victim, released, "deadlock victim aborted");
        self.events.push(Event::VictimAborted {
            txn: victim,
            released,
        });
    }
}
