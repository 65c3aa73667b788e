//! Graph diff classification.
//!
//! Given the current node/edge sets and the previous node cache, picks the cheapest update
//! strategy that cannot visibly misplace anything. The checks run from cheapest/safest to most
//! expensive; each is a conservative sufficient condition for reusing old coordinates.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::cache::NodeCache;
use crate::model::{Edge, Node};

/// The strategy selected for one call. Produced only by [`classify`] so the predicates live in
/// one place instead of being scattered across call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    /// No previously-unseen node: pure cache copy, no geometry recomputation.
    PositionCopy,
    /// Every unseen node is degree 0: grid placement next to the existing layout.
    SingleNode,
    /// Every unseen node is degree 0 or fits an existing rank: lateral insertion.
    SameRank,
    /// Anything else: full solver run.
    Full,
}

/// Which incremental strategies are active. Resolved from the feature-flag collaborator before
/// classification; a disabled branch falls through to the next check.
#[derive(Debug, Clone, Copy)]
pub struct StrategyGates {
    pub single_node: bool,
    pub same_rank: bool,
}

impl Default for StrategyGates {
    fn default() -> Self {
        Self {
            single_node: true,
            same_rank: true,
        }
    }
}

pub fn classify(
    nodes: &IndexMap<String, Node>,
    edges: &IndexMap<String, Edge>,
    node_cache: &NodeCache,
    gates: StrategyGates,
) -> UpdateKind {
    let unseen: Vec<&Node> = nodes
        .values()
        .filter(|n| !node_cache.contains_key(&n.id))
        .collect();

    if nodes.len() <= node_cache.len() && unseen.is_empty() {
        return UpdateKind::PositionCopy;
    }

    // The incremental insertions below need a previous layout to anchor against.
    if node_cache.is_empty() {
        return UpdateKind::Full;
    }

    if gates.single_node && unseen.iter().all(|n| n.degree == 0) {
        return UpdateKind::SingleNode;
    }

    if gates.same_rank {
        // An edge joining two unseen nodes has no existing anchor point constraining it, so the
        // whole structure cannot be inserted incrementally.
        let joins_two_unseen = edges.values().any(|e| {
            !node_cache.contains_key(&e.source) && !node_cache.contains_key(&e.target)
        });
        if !joins_two_unseen {
            let cached_ranks: FxHashSet<i32> =
                node_cache.values().filter_map(|p| p.rank).collect();
            let insertable = unseen.iter().all(|n| {
                if n.degree == 0 {
                    // This strategy grid-places degree-0 newcomers too, so they stay behind
                    // their own gate here as well.
                    gates.single_node
                } else {
                    n.rank.is_some_and(|r| cached_ranks.contains(&r))
                }
            });
            if insertable {
                return UpdateKind::SameRank;
            }
        }
    }

    UpdateKind::Full
}
