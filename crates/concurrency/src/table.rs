//! Mirrored lock bookkeeping.
//!
//! The table keeps two views of the same facts:
//! - per item: which transactions hold it, and in which mode
//! - per transaction: which items it holds, and in which mode
//!
//! Every mutation updates both views in the same call. The table has no
//! locking of its own; [`crate::LockManager`] serializes access.

use lockstep_core::{ItemId, LockMode, TxnId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// One granted lock, as seen from the item side.
#[derive(Debug, Clone, Copy)]
struct HeldLock {
    txn: TxnId,
    mode: LockMode,
}

/// The mirrored lock structures.
///
/// Invariant (per item): either every holder is Shared, or there is exactly
/// one holder and it is Exclusive.
#[derive(Debug, Default)]
pub(crate) struct LockTable {
    /// Item → current holders. Short inline vector: contention on one item
    /// rarely involves more than a couple of transactions.
    holders: FxHashMap<ItemId, SmallVec<[HeldLock; 2]>>,
    /// Transaction → held items. Mirror of `holders`.
    by_txn: FxHashMap<TxnId, FxHashMap<ItemId, LockMode>>,
}

impl LockTable {
    /// Attempt to acquire `mode` on `item` for `txn`.
    ///
    /// Returns whether the lock was granted. Denial mutates nothing.
    /// Re-requesting a mode the transaction already covers is an idempotent
    /// grant; a Shared holder requesting Exclusive is an upgrade, granted
    /// only when no other transaction holds the item, and recorded by
    /// changing the existing entry's mode in place.
    pub(crate) fn try_acquire(&mut self, txn: TxnId, item: ItemId, mode: LockMode) -> bool {
        let held = self
            .by_txn
            .get(&txn)
            .and_then(|locks| locks.get(&item))
            .copied();

        match held {
            Some(current) if current.covers(mode) => true,
            Some(_) => {
                // Shared holder asking for Exclusive: upgrade. The
                // requester's own entry is not a conflict.
                let others = self
                    .holders
                    .get(&item)
                    .map(|hs| hs.iter().any(|h| h.txn != txn))
                    .unwrap_or(false);
                if others {
                    return false;
                }
                self.set_mode(txn, item, LockMode::Exclusive);
                true
            }
            None => {
                let compatible = self
                    .holders
                    .get(&item)
                    .map(|hs| hs.iter().all(|h| h.mode.admits(mode)))
                    .unwrap_or(true);
                if !compatible {
                    return false;
                }
                self.insert(txn, item, mode);
                true
            }
        }
    }

    /// Drop every lock `txn` holds, from both views. Returns the count.
    pub(crate) fn release_all(&mut self, txn: TxnId) -> usize {
        let Some(locks) = self.by_txn.remove(&txn) else {
            return 0;
        };
        for item in locks.keys() {
            if let Some(hs) = self.holders.get_mut(item) {
                hs.retain(|h| h.txn != txn);
                if hs.is_empty() {
                    self.holders.remove(item);
                }
            }
        }
        locks.len()
    }

    /// Locks held by `txn`, ordered by item.
    pub(crate) fn locks_of(&self, txn: TxnId) -> Vec<(ItemId, LockMode)> {
        let mut locks: Vec<(ItemId, LockMode)> = self
            .by_txn
            .get(&txn)
            .map(|ls| ls.iter().map(|(&i, &m)| (i, m)).collect())
            .unwrap_or_default();
        locks.sort_by_key(|&(item, _)| item);
        locks
    }

    /// Current holders of `item`, ordered by transaction.
    pub(crate) fn holders_of(&self, item: ItemId) -> Vec<(TxnId, LockMode)> {
        let mut holders: Vec<(TxnId, LockMode)> = self
            .holders
            .get(&item)
            .map(|hs| hs.iter().map(|h| (h.txn, h.mode)).collect())
            .unwrap_or_default();
        holders.sort_by_key(|&(txn, _)| txn);
        holders
    }

    /// Total number of held locks.
    pub(crate) fn lock_count(&self) -> usize {
        self.by_txn.values().map(|ls| ls.len()).sum()
    }

    fn insert(&mut self, txn: TxnId, item: ItemId, mode: LockMode) {
        self.holders
            .entry(item)
            .or_default()
            .push(HeldLock { txn, mode });
        self.by_txn.entry(txn).or_default().insert(item, mode);
    }

    fn set_mode(&mut self, txn: TxnId, item: ItemId, mode: LockMode) {
        if let Some(hs) = self.holders.get_mut(&item) {
            for h in hs.iter_mut() {
                if h.txn == txn {
                    h.mode = mode;
                }
            }
        }
        if let Some(ls) = self.by_txn.get_mut(&txn) {
            ls.insert(item, mode);
        }
    }
}
