//! Lock manager: the single authority over lock state.
//!
//! All lock decisions go through [`LockManager`]. One mutex guards the
//! mirrored table, so a request or release mutates both bookkeeping views as
//! one atomic unit and grants/denials for any item are linearizable. The
//! reference scheduler is single-threaded, but nothing here assumes it: a
//! one-task-per-transaction deployment works against the same manager.

use lockstep_core::{Error, ItemId, LockMode, Result, TxnId};
use parking_lot::Mutex;

use crate::table::LockTable;

/// Grants, denies, and releases item locks under S2PL rules.
///
/// Transactions are not pre-registered: a transaction id the manager has
/// never seen simply holds nothing. A denied request is not an error — the
/// caller keeps the command queued and retries on a later turn.
pub struct LockManager {
    /// Number of addressable items; requests beyond this fail.
    items: usize,
    table: Mutex<LockTable>,
}

impl LockManager {
    /// A manager for a store of `items` slots.
    pub fn new(items: usize) -> Self {
        LockManager {
            items,
            table: Mutex::new(LockTable::default()),
        }
    }

    /// Number of addressable items.
    pub fn item_count(&self) -> usize {
        self.items
    }

    /// Request `mode` on `item` for `txn`.
    ///
    /// Returns `Ok(true)` on grant, `Ok(false)` on denial (nothing mutated),
    /// `Err(ItemOutOfBounds)` for an item the store does not have.
    ///
    /// Grant rules:
    /// - Shared: no other transaction holds Exclusive on the item.
    /// - Exclusive: no other transaction holds anything on the item.
    /// - Already holding a covering mode: idempotent grant.
    /// - Holding Shared, requesting Exclusive: upgrade, granted only when no
    ///   other holder exists; the entry's mode changes in place.
    pub fn request(&self, txn: TxnId, item: ItemId, mode: LockMode) -> Result<bool> {
        if item.index() >= self.items {
            return Err(Error::ItemOutOfBounds {
                item,
                len: self.items,
            });
        }
        let granted = self.table.lock().try_acquire(txn, item, mode);
        tracing::debug!(%txn, %item, %mode, granted, "lock request");
        Ok(granted)
    }

    /// Release every lock `txn` holds. Returns how many were released;
    /// releasing for a transaction that holds nothing is a no-op returning 0.
    pub fn release_all(&self, txn: TxnId) -> usize {
        let released = self.table.lock().release_all(txn);
        if released > 0 {
            tracing::debug!(%txn, released, "released all locks");
        }
        released
    }

    /// Snapshot of the locks `txn` currently holds, ordered by item.
    pub fn held_locks(&self, txn: TxnId) -> Vec<(ItemId, LockMode)> {
        self.table.lock().locks_of(txn)
    }

    /// Snapshot of the transactions currently holding `item`.
    pub fn holders(&self, item: ItemId) -> Vec<(TxnId, LockMode)> {
        self.table.lock().holders_of(item)
    }

    /// Total number of locks currently held across all transactions.
    pub fn lock_count(&self) -> usize {
        self.table.lock().lock_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: TxnId = TxnId(0);
    const T1: TxnId = TxnId(1);

    #[test]
    fn out_of_range_item_is_an_error() {
        let locks = LockManager::new(2);
        let err = locks.request(T0, ItemId(2), LockMode::Shared).unwrap_err();
        assert!(matches!(err, Error::ItemOutOfBounds { len: 2, .. }));
    }

    #[test]
    fn unknown_txn_is_fresh_not_an_error() {
        let locks = LockManager::new(1);
        assert_eq!(locks.release_all(TxnId(99)), 0);
        assert_eq!(locks.held_locks(TxnId(99)), vec![]);
        assert!(locks.request(TxnId(99), ItemId(0), LockMode::Shared).unwrap());
    }

    #[test]
    fn shared_then_foreign_exclusive_denied_until_release() {
        let locks = LockManager::new(1);
        assert!(locks.request(T0, ItemId(0), LockMode::Shared).unwrap());
        assert!(!locks.request(T1, ItemId(0), LockMode::Exclusive).unwrap());
        assert_eq!(locks.release_all(T0), 1);
        assert!(locks.request(T1, ItemId(0), LockMode::Exclusive).unwrap());
    }

    #[test]
    fn held_locks_snapshot_after_release_is_empty() {
        let locks = LockManager::new(3);
        locks.request(T0, ItemId(1), LockMode::Shared).unwrap();
        locks.request(T0, ItemId(2), LockMode::Exclusive).unwrap();
        assert_eq!(
            locks.held_locks(T0),
            vec![(ItemId(1), LockMode::Shared), (ItemId(2), LockMode::Exclusive)]
        );
        locks.release_all(T0);
        assert_eq!(locks.held_locks(T0), vec![]);
    }

    #[test]
    fn holders_reports_all_shared_holders() {
        let locks = LockManager::new(1);
        locks.request(T0, ItemId(0), LockMode::Shared).unwrap();
        locks.request(T1, ItemId(0), LockMode::Shared).unwrap();
        assert_eq!(
            locks.holders(ItemId(0)),
            vec![(T0, LockMode::Shared), (T1, LockMode::Shared)]
        );
    }
}
