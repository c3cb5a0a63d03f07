//! Identifier newtypes and lock modes.

use serde::{Deserialize, Serialize};

/// Identifier of one transaction.
///
/// Assigned densely from 0 in the order scripts are loaded; a TxnId never
/// needs pre-registration anywhere — the lock manager treats ids it has not
/// seen as holding nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxnId(pub u32);

impl TxnId {
    /// Raw numeric id.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for TxnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Index of one slot in the shared store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub usize);

impl ItemId {
    /// Raw slot index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item {}", self.0)
    }
}

/// Access mode of a lock.
///
/// Shared locks are compatible with each other; an exclusive lock is
/// compatible with nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockMode {
    /// Read access. Any number of transactions may hold Shared on one item.
    Shared,
    /// Write access. At most one transaction, and no Shared holders.
    Exclusive,
}

impl LockMode {
    /// Whether a holder in `self` mode allows another transaction to be
    /// granted `requested`.
    pub fn admits(&self, requested: LockMode) -> bool {
        matches!(
            (self, requested),
            (LockMode::Shared, LockMode::Shared)
        )
    }

    /// Whether a lock held in `self` mode already satisfies a request for
    /// `requested` by the same transaction (Exclusive covers Shared).
    pub fn covers(&self, requested: LockMode) -> bool {
        match self {
            LockMode::Exclusive => true,
            LockMode::Shared => requested == LockMode::Shared,
        }
    }
}

impl std::fmt::Display for LockMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockMode::Shared => write!(f, "S"),
            LockMode::Exclusive => write!(f, "X"),
        }
    }
}
