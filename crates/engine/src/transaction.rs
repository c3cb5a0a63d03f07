//! A transaction: local registers plus a FIFO queue of commands.

use std::collections::VecDeque;

use lockstep_core::{Command, Error, Result, TxnId};
use lockstep_storage::Store;

/// One scripted transaction.
///
/// Commands are consumed from the front of the queue as they execute; the
/// transaction is finished once the queue is empty, and never transitions
/// out of that state. Lock state lives entirely in the lock manager — a
/// transaction only ever touches its own registers and, for Read/Write, the
/// store slot the scheduler already locked on its behalf.
///
/// Register `i` starts out holding the value `i`.
#[derive(Debug, Clone)]
pub struct Transaction {
    id: TxnId,
    registers: Vec<i64>,
    queue: VecDeque<Command>,
}

impl Transaction {
    /// A transaction with `register_count` local registers and the given
    /// command queue.
    pub fn new(id: TxnId, register_count: usize, commands: Vec<Command>) -> Self {
        Transaction {
            id,
            registers: (0..register_count as i64).collect(),
            queue: commands.into(),
        }
    }

    /// This transaction's id.
    pub fn id(&self) -> TxnId {
        self.id
    }

    /// The next command to execute, if any.
    pub fn next_command(&self) -> Option<&Command> {
        self.queue.front()
    }

    /// Remove and return the front command. `None` when already finished —
    /// callers must not pop a finished transaction.
    pub fn pop_command(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    /// Whether the command queue is empty.
    pub fn finished(&self) -> bool {
        self.queue.is_empty()
    }

    /// Commands still queued.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Current register contents.
    pub fn registers(&self) -> &[i64] {
        &self.registers
    }

    /// Execute one command.
    ///
    /// Read and Write touch the store; the caller is responsible for holding
    /// the matching lock before calling. Everything else mutates only local
    /// registers. Arithmetic wraps on overflow. Print is a no-op here — the
    /// scheduler emits the store dump itself.
    pub fn execute(&mut self, cmd: &Command, store: &mut Store) -> Result<()> {
        match *cmd {
            Command::Read { item, dest } => {
                let value = store.read(item)?;
                *self.reg_mut(dest)? = value;
            }
            Command::Write { src, item } => {
                let value = self.reg(src)?;
                store.write(item, value)?;
            }
            Command::Add { reg, value } => {
                let r = self.reg_mut(reg)?;
                *r = r.wrapping_add(value);
            }
            Command::Sub { reg, value } => {
                let r = self.reg_mut(reg)?;
                *r = r.wrapping_sub(value);
            }
            Command::Mult { reg, value } => {
                let r = self.reg_mut(reg)?;
                *r = r.wrapping_mul(value);
            }
            Command::Copy { dest, src } => {
                let value = self.reg(src)?;
                *self.reg_mut(dest)? = value;
            }
            Command::Combine { dest, src } => {
                let value = self.reg(src)?;
                let r = self.reg_mut(dest)?;
                *r = r.wrapping_add(value);
            }
            Command::Print => {}
        }
        Ok(())
    }

    fn reg(&self, index: usize) -> Result<i64> {
        self.registers
            .get(index)
            .copied()
            .ok_or(Error::RegisterOutOfBounds {
                register: index,
                len: self.registers.len(),
            })
    }

    fn reg_mut(&mut self, index: usize) -> Result<&mut i64> {
        let len = self.registers.len();
        self.registers
            .get_mut(index)
            .ok_or(Error::RegisterOutOfBounds {
                register: index,
                len,
            })
    }
}

/// Renders the id and the current register contents, the transaction-side
/// counterpart of [`Store`]'s display.
impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} registers [", self.id)?;
        for (i, v) in self.registers.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}
