//! Unified error type for lockstep.
//!
//! Two things deliberately are *not* errors:
//! - a denied lock request — that is expected control flow (`Ok(false)`)
//!   leading to retry on a later turn;
//! - a detected deadlock — that is a run-level outcome reported by the
//!   scheduler, not a fault of any single call.

use thiserror::Error;

use crate::types::ItemId;

/// All lockstep errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed script line or header. Fatal at load time, before any
    /// scheduling starts.
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number in the script.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Store slot index outside the store. Aborts only the transaction that
    /// issued the access.
    #[error("{item} out of range (store has {len} slots)")]
    ItemOutOfBounds {
        /// The offending slot.
        item: ItemId,
        /// Store size.
        len: usize,
    },

    /// Local register index outside the transaction's register file. Aborts
    /// only the offending transaction.
    #[error("register {register} out of range (transaction declared {len})")]
    RegisterOutOfBounds {
        /// The offending register index.
        register: usize,
        /// Declared register count.
        len: usize,
    },

    /// I/O failure while loading a script file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for lockstep operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error aborts a single transaction rather than the run.
    ///
    /// Parse and I/O errors surface before scheduling and kill the load;
    /// bounds errors surface mid-run and abort only the offender.
    pub fn is_transaction_local(&self) -> bool {
        matches!(
            self,
            Error::ItemOutOfBounds { .. } | Error::RegisterOutOfBounds { .. }
        )
    }
}
