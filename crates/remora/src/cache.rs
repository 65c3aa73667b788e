//! Per-topology layout caches and the store that owns them.
//!
//! A topology is a named graph configuration/view; each gets its own cache entry holding the
//! last committed layout, the persistent node/edge caches and the solver instance. Caches are
//! merged (right-biased), never replaced, after every successful layout: stale entries from
//! removed nodes linger but are harmless because all lookups are by id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::LayoutEngine;
use crate::model::{Edge, Layout, Node};

/// Cached layout-relevant node fields. Deliberately not the full [`Node`]: everything else on a
/// node is volatile, non-layout data that must come from the current call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub x: f64,
    pub y: f64,
    pub rank: Option<i32>,
}

impl From<&Node> for NodePosition {
    fn from(n: &Node) -> Self {
        Self {
            x: n.x,
            y: n.y,
            rank: n.rank,
        }
    }
}

pub type NodeCache = IndexMap<String, NodePosition>;
pub type EdgeCache = IndexMap<String, Edge>;

/// One topology's mutable layout state. The engine instance persists across calls so the solver
/// keeps its incremental graph instead of rebuilding it from scratch.
pub struct TopologyCache {
    pub layout: Option<Layout>,
    pub node_cache: NodeCache,
    pub edge_cache: EdgeCache,
    pub engine: Box<dyn LayoutEngine>,
}

impl TopologyCache {
    pub fn new(engine: Box<dyn LayoutEngine>) -> Self {
        Self {
            layout: None,
            node_cache: NodeCache::new(),
            edge_cache: EdgeCache::new(),
            engine,
        }
    }

    /// Commits a finished layout: merges its node/edge data over the existing caches
    /// (right-biased, overlapping ids overwritten) and records it as the last layout.
    pub fn commit(&mut self, layout: &Layout) {
        for (id, node) in &layout.nodes {
            self.node_cache.insert(id.clone(), NodePosition::from(node));
        }
        for (id, edge) in &layout.edges {
            self.edge_cache.insert(id.clone(), edge.clone());
        }
        self.layout = Some(layout.clone());
    }
}

/// Derives the cache key for a topology configuration. Options are folded in via their JSON
/// serialization, so two views of the same topology with different options cache independently.
pub fn topology_key(topology_id: &str, topology_options: &Value) -> String {
    match serde_json::to_string(topology_options) {
        Ok(opts) if topology_options != &Value::Null => format!("{topology_id}/{opts}"),
        _ => topology_id.to_string(),
    }
}

/// Explicit store of per-topology caches, owned by the layout controller. Entries are created
/// lazily on first use and live until evicted.
#[derive(Default)]
pub struct CacheStore {
    entries: IndexMap<String, TopologyCache>,
}

impl CacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_insert_with(
        &mut self,
        key: &str,
        engine: impl FnOnce() -> Box<dyn LayoutEngine>,
    ) -> &mut TopologyCache {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| TopologyCache::new(engine()))
    }

    pub fn get(&self, key: &str) -> Option<&TopologyCache> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut TopologyCache> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn evict(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LayeredEngine;
    use serde_json::json;

    #[test]
    fn commit_merges_right_biased_and_keeps_stale_ids() {
        let mut cache = TopologyCache::new(Box::new(LayeredEngine::new()));
        let mut old = Node::new("gone");
        old.x = 1.0;
        cache.node_cache.insert("gone".into(), NodePosition::from(&old));

        let mut n = Node::new("a");
        n.x = 10.0;
        n.y = 20.0;
        n.rank = Some(2);
        let layout = Layout::from_parts(&[n], &[]);
        cache.commit(&layout);

        assert_eq!(cache.node_cache["a"].x, 10.0);
        assert_eq!(cache.node_cache["a"].rank, Some(2));
        // Stale entry survives the merge.
        assert_eq!(cache.node_cache["gone"].x, 1.0);
        assert!(cache.layout.is_some());
    }

    #[test]
    fn topology_keys_separate_option_sets() {
        let plain = topology_key("mesh", &Value::Null);
        let a = topology_key("mesh", &json!({"namespace": "a"}));
        let b = topology_key("mesh", &json!({"namespace": "b"}));
        assert_eq!(plain, "mesh");
        assert_ne!(a, b);
        assert_ne!(a, plain);
    }

    #[test]
    fn store_creates_lazily_and_evicts_explicitly() {
        let mut store = CacheStore::new();
        assert!(store.is_empty());
        store.get_or_insert_with("t", || Box::new(LayeredEngine::new()));
        assert!(store.contains("t"));
        assert_eq!(store.len(), 1);
        assert!(store.evict("t"));
        assert!(!store.evict("t"));
        assert!(store.is_empty());
    }
}
