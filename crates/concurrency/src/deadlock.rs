//! Wait-for graph deadlock detection.
//!
//! An edge `a → b` means transaction `a` is blocked on an item held by `b`
//! in a mode that conflicts with `a`'s request. A cycle among such edges is
//! a deadlock: everyone on the cycle waits for a lock that can only be
//! released by someone else on the cycle.
//!
//! The graph is rebuilt from live lock-table state on every check, so a
//! stale "blocked" marker on a transaction whose conflict has since been
//! released or replaced by a compatible holder contributes no edges and can
//! never fabricate a cycle.

use lockstep_core::{ItemId, LockMode, TxnId};
use rustc_hash::FxHashMap;

use crate::LockManager;

/// Directed waits-for relation over transactions.
#[derive(Debug, Default)]
pub struct WaitForGraph {
    edges: FxHashMap<TxnId, Vec<TxnId>>,
}

impl WaitForGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from the currently blocked transactions.
    ///
    /// `waits` carries, for each blocked transaction, the item and mode of
    /// its denied request. An edge goes to a current holder of that item
    /// only when the holder's mode actually conflicts with the request: a
    /// Shared waiter is not blocked by Shared holders, no matter what was
    /// holding the item when the request was first denied. The waiter's own
    /// lock never counts (the upgrade case).
    pub fn build(waits: &[(TxnId, ItemId, LockMode)], locks: &LockManager) -> Self {
        let mut graph = WaitForGraph::new();
        for &(txn, item, mode) in waits {
            for (holder, held) in locks.holders(item) {
                if holder != txn && !held.admits(mode) {
                    graph.add_edge(txn, holder);
                }
            }
        }
        graph
    }

    /// Record that `from` waits for `to`. Duplicate edges are dropped;
    /// self-edges are meaningless here and ignored.
    pub fn add_edge(&mut self, from: TxnId, to: TxnId) {
        if from == to {
            return;
        }
        let succs = self.edges.entry(from).or_default();
        if !succs.contains(&to) {
            succs.push(to);
        }
    }

    /// Number of transactions with at least one outgoing edge.
    pub fn waiter_count(&self) -> usize {
        self.edges.len()
    }

    /// Find one cycle, if any, returning its members in wait order.
    ///
    /// Iterative DFS; transactions are visited in id order so the result is
    /// deterministic for a given graph.
    pub fn find_cycle(&self) -> Option<Vec<TxnId>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            InProgress,
            Done,
        }

        let mut marks: FxHashMap<TxnId, Mark> = FxHashMap::default();
        let mut roots: Vec<TxnId> = self.edges.keys().copied().collect();
        roots.sort();

        for root in roots {
            if marks.contains_key(&root) {
                continue;
            }
            // Stack of (node, index of next successor to try).
            let mut path: Vec<(TxnId, usize)> = vec![(root, 0)];
            marks.insert(root, Mark::InProgress);

            while let Some(&(node, next)) = path.last() {
                let succs = self
                    .edges
                    .get(&node)
                    .map(|v| v.as_slice())
                    .unwrap_or_default();
                if next < succs.len() {
                    if let Some(frame) = path.last_mut() {
                        frame.1 += 1;
                    }
                    let succ = succs[next];
                    match marks.get(&succ) {
                        None => {
                            marks.insert(succ, Mark::InProgress);
                            path.push((succ, 0));
                        }
                        Some(Mark::InProgress) => {
                            // In-progress nodes are exactly the current path;
                            // the cycle runs from succ's frame to the top.
                            let start = path
                                .iter()
                                .position(|&(n, _)| n == succ)
                                .unwrap_or(0);
                            return Some(path[start..].iter().map(|&(n, _)| n).collect());
                        }
                        Some(Mark::Done) => {}
                    }
                } else {
                    marks.insert(node, Mark::Done);
                    path.pop();
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: TxnId = TxnId(0);
    const T1: TxnId = TxnId(1);
    const T2: TxnId = TxnId(2);

    #[test]
    fn empty_graph_has_no_cycle() {
        assert_eq!(WaitForGraph::new().find_cycle(), None);
    }

    #[test]
    fn chain_is_not_a_cycle() {
        let mut g = WaitForGraph::new();
        g.add_edge(T0, T1);
        g.add_edge(T1, T2);
        assert_eq!(g.find_cycle(), None);
    }

    #[test]
    fn two_cycle_detected() {
        let mut g = WaitForGraph::new();
        g.add_edge(T0, T1);
        g.add_edge(T1, T0);
        let cycle = g.find_cycle().unwrap();
        assert_eq!(cycle.len(), 2);
        assert!(cycle.contains(&T0) && cycle.contains(&T1));
    }

    #[test]
    fn three_cycle_behind_a_tail_detected() {
        // T0 waits into a cycle it is not part of.
        let mut g = WaitForGraph::new();
        g.add_edge(T0, T1);
        g.add_edge(T1, T2);
        g.add_edge(T2, T1);
        let cycle = g.find_cycle().unwrap();
        assert_eq!(cycle.len(), 2);
        assert!(cycle.contains(&T1) && cycle.contains(&T2));
        assert!(!cycle.contains(&T0));
    }

    #[test]
    fn self_edges_are_ignored() {
        let mut g = WaitForGraph::new();
        g.add_edge(T0, T0);
        assert_eq!(g.waiter_count(), 0);
        assert_eq!(g.find_cycle(), None);
    }

    #[test]
    fn build_excludes_own_shared_lock_in_upgrade_wait() {
        // Both hold Shared on item 0; both wait to upgrade. Edges must only
        // point at the other holder, giving the classic two-cycle.
        let locks = LockManager::new(1);
        locks.request(T0, ItemId(0), LockMode::Shared).unwrap();
        locks.request(T1, ItemId(0), LockMode::Shared).unwrap();
        let waits = [
            (T0, ItemId(0), LockMode::Exclusive),
            (T1, ItemId(0), LockMode::Exclusive),
        ];
        let g = WaitForGraph::build(&waits, &locks);
        let cycle = g.find_cycle().unwrap();
        assert_eq!(cycle.len(), 2);
    }

    #[test]
    fn build_from_released_holder_adds_no_edges() {
        let locks = LockManager::new(2);
        locks.request(T1, ItemId(0), LockMode::Exclusive).unwrap();
        locks.release_all(T1);
        // T0's blocked marker is stale: nobody holds item 0 anymore.
        let g = WaitForGraph::build(&[(T0, ItemId(0), LockMode::Shared)], &locks);
        assert_eq!(g.waiter_count(), 0);
        assert_eq!(g.find_cycle(), None);
    }

    #[test]
    fn build_skips_holders_compatible_with_the_request() {
        // T0's Shared request was denied while T1 held Exclusive. T1 has
        // since released and T2 took Shared instead; a Shared holder does
        // not block a Shared waiter, so no edge may appear.
        let locks = LockManager::new(1);
        locks.request(T1, ItemId(0), LockMode::Exclusive).unwrap();
        locks.release_all(T1);
        locks.request(T2, ItemId(0), LockMode::Shared).unwrap();
        let g = WaitForGraph::build(&[(T0, ItemId(0), LockMode::Shared)], &locks);
        assert_eq!(g.waiter_count(), 0);
        assert_eq!(g.find_cycle(), None);
    }
}
