//! Transaction commands.
//!
//! A [`Command`] is the unit of work a transaction executes. The set is
//! closed: anything a script can say is one of these variants, and operand
//! validation happens at parse time, not execution time.
//!
//! Only `Read` and `Write` touch the shared store and therefore carry a
//! lock intent; everything else operates on transaction-local registers.

use serde::{Deserialize, Serialize};

use crate::types::{ItemId, LockMode};

/// One operation in a transaction's script.
///
/// Arithmetic (`Add`/`Sub`/`Mult`/`Combine`) wraps on overflow; scripts that
/// care about exact values stay within i64 range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    /// Copy `store[item]` into local register `dest`. Needs a Shared (or
    /// stronger) lock on `item`.
    Read {
        /// Store slot to read.
        item: ItemId,
        /// Local register receiving the value.
        dest: usize,
    },
    /// Copy local register `src` into `store[item]`. Needs an Exclusive lock
    /// on `item`.
    Write {
        /// Local register supplying the value.
        src: usize,
        /// Store slot to overwrite.
        item: ItemId,
    },
    /// `local[reg] += value`.
    Add {
        /// Target register.
        reg: usize,
        /// Immediate operand.
        value: i64,
    },
    /// `local[reg] -= value`.
    Sub {
        /// Target register.
        reg: usize,
        /// Immediate operand.
        value: i64,
    },
    /// `local[reg] *= value`.
    Mult {
        /// Target register.
        reg: usize,
        /// Immediate operand.
        value: i64,
    },
    /// `local[dest] = local[src]`.
    Copy {
        /// Register overwritten.
        dest: usize,
        /// Register read.
        src: usize,
    },
    /// `local[dest] += local[src]`.
    Combine {
        /// Register accumulated into.
        dest: usize,
        /// Register read.
        src: usize,
    },
    /// Dump the store contents. Diagnostic only: takes no lock, so the dump
    /// may observe values from uncommitted writers. That weaker guarantee is
    /// intentional.
    Print,
}

impl Command {
    /// The lock this command must hold before executing, if any.
    pub fn lock_intent(&self) -> Option<(ItemId, LockMode)> {
        match self {
            Command::Read { item, .. } => Some((*item, LockMode::Shared)),
            Command::Write { item, .. } => Some((*item, LockMode::Exclusive)),
            _ => None,
        }
    }

    /// The script opcode for this command.
    pub fn opcode(&self) -> char {
        match self {
            Command::Read { .. } => 'R',
            Command::Write { .. } => 'W',
            Command::Add { .. } => 'A',
            Command::Sub { .. } => 'S',
            Command::Mult { .. } => 'M',
            Command::Copy { .. } => 'C',
            Command::Combine { .. } => 'O',
            Command::Print => 'P',
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Read { item, dest } => write!(f, "R {} {}", item.0, dest),
            Command::Write { src, item } => write!(f, "W {} {}", src, item.0),
            Command::Add { reg, value } => write!(f, "A {} {}", reg, value),
            Command::Sub { reg, value } => write!(f, "S {} {}", reg, value),
            Command::Mult { reg, value } => write!(f, "M {} {}", reg, value),
            Command::Copy { dest, src } => write!(f, "C {} {}", dest, src),
            Command::Combine { dest, src } => write!(f, "O {} {}", dest, src),
            Command::Print => write!(f, "P"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_wants_shared() {
        let cmd = Command::Read {
            item: ItemId(4),
            dest: 0,
        };
        assert_eq!(cmd.lock_intent(), Some((ItemId(4), LockMode::Shared)));
    }

    #[test]
    fn write_wants_exclusive() {
        let cmd = Command::Write {
            src: 1,
            item: ItemId(2),
        };
        assert_eq!(cmd.lock_intent(), Some((ItemId(2), LockMode::Exclusive)));
    }

    #[test]
    fn local_commands_take_no_lock() {
        let locals = [
            Command::Add { reg: 0, value: 1 },
            Command::Sub { reg: 0, value: 1 },
            Command::Mult { reg: 0, value: 2 },
            Command::Copy { dest: 0, src: 1 },
            Command::Combine { dest: 0, src: 1 },
            Command::Print,
        ];
        for cmd in locals {
            assert_eq!(cmd.lock_intent(), None, "{cmd} should not lock");
        }
    }

    #[test]
    fn display_round_trips_opcode() {
        let cmd = Command::Write {
            src: 0,
            item: ItemId(1),
        };
        assert_eq!(cmd.to_string(), "W 0 1");
        assert_eq!(cmd.opcode(), 'W');
    }

    #[test]
    fn serializes_with_op_tag() {
        let json = serde_json::to_value(Command::Print).unwrap();
        assert_eq!(json["op"], "print");
    }
}
