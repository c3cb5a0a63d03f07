//! Property tests for lock-table invariants.
//!
//! After any sequence of requests and releases:
//! - per item, holders are all Shared or exactly one Exclusive
//! - the per-item and per-transaction views mirror each other exactly

use lockstep_concurrency::LockManager;
use lockstep_core::{ItemId, LockMode, TxnId};
use proptest::prelude::*;

const TXNS: u32 = 4;
const ITEMS: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    Request { txn: u32, item: usize, exclusive: bool },
    ReleaseAll { txn: u32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..TXNS, 0..ITEMS, any::<bool>())
            .prop_map(|(txn, item, exclusive)| Op::Request { txn, item, exclusive }),
        1 => (0..TXNS).prop_map(|txn| Op::ReleaseAll { txn }),
    ]
}

fn assert_consistent(locks: &LockManager) {
    let mut seen_from_items = 0;
    for i in 0..ITEMS {
        let holders = locks.holders(ItemId(i));
        let exclusive = holders
            .iter()
            .filter(|(_, m)| *m == LockMode::Exclusive)
            .count();
        // All-Shared, or a single Exclusive holder and nobody else.
        if exclusive > 0 {
            assert_eq!(
                holders.len(),
                1,
                "item {i}: exclusive lock coexists with other holders: {holders:?}"
            );
        }
        // No transaction appears twice on one item.
        let mut txns: Vec<TxnId> = holders.iter().map(|(t, _)| *t).collect();
        txns.dedup();
        assert_eq!(txns.len(), holders.len(), "item {i}: duplicate holder");
        seen_from_items += holders.len();
    }

    // The per-transaction view mirrors the per-item view.
    let mut seen_from_txns = 0;
    for t in 0..TXNS {
        let txn = TxnId(t);
        for (item, mode) in locks.held_locks(txn) {
            assert!(
                locks.holders(item).contains(&(txn, mode)),
                "{txn} claims {mode} on {item} but the item side disagrees"
            );
            seen_from_txns += 1;
        }
    }
    assert_eq!(seen_from_items, seen_from_txns);
    assert_eq!(locks.lock_count(), seen_from_txns);
}

proptest! {
    #[test]
    fn invariants_hold_under_any_op_sequence(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let locks = LockManager::new(ITEMS);
        for op in ops {
            match op {
                Op::Request { txn, item, exclusive } => {
                    let mode = if exclusive { LockMode::Exclusive } else { LockMode::Shared };
                    locks.request(TxnId(txn), ItemId(item), mode).unwrap();
                }
                Op::ReleaseAll { txn } => {
                    locks.release_all(TxnId(txn));
                }
            }
            assert_consistent(&locks);
        }
    }

    #[test]
    fn release_all_returns_exact_count(
        grabs in prop::collection::vec((0..ITEMS, any::<bool>()), 0..16)
    ) {
        let locks = LockManager::new(ITEMS);
        let txn = TxnId(0);
        for (item, exclusive) in grabs {
            let mode = if exclusive { LockMode::Exclusive } else { LockMode::Shared };
            locks.request(txn, ItemId(item), mode).unwrap();
        }
        let held = locks.held_locks(txn).len();
        prop_assert_eq!(locks.release_all(txn), held);
        prop_assert_eq!(locks.release_all(txn), 0);
        prop_assert_eq!(locks.lock_count(), 0);
    }
}
