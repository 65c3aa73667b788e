//! Core graph model shared by the placement strategies, the engine adapter and the cache.
//!
//! Node ids are stable caller-supplied strings; edge ids are derived from the endpoint pair so
//! that an edge keeps its identity across calls even when the caller rebuilds its edge list.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Square footprint a node occupies during layout. Intentionally larger than the rendered node
/// body so curved edge paths do not clip through neighbouring nodes.
pub const NODE_FOOTPRINT: f64 = 60.0;

/// Horizontal gap between two nodes on the same rank.
pub const NODE_SEPARATION: f64 = 20.0;

/// Vertical gap between two adjacent ranks.
pub const RANK_SEPARATION: f64 = 50.0;

/// Upper bound on the number of waypoints in a rendered edge path.
pub const EDGE_WAYPOINTS_CAP: usize = 12;

/// Minimum distance allowed between two node centers before a committed layout is considered
/// visually broken and a full re-layout is forced.
pub const MIN_NODE_DISTANCE: f64 = NODE_FOOTPRINT + NODE_SEPARATION;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub fn point(x: f64, y: f64) -> Point {
    Point { x, y }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Center coordinates, assigned by the engine or by a placement strategy.
    pub x: f64,
    pub y: f64,
    /// Engine-assigned ordering tier. All nodes of one rank share a y coordinate.
    pub rank: Option<i32>,
    /// Number of incident edges, recomputed from the current edge set on every call.
    pub degree: usize,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            rank: None,
            degree: 0,
        }
    }

    pub fn center(&self) -> Point {
        point(self.x, self.y)
    }
}

/// Derives the stable edge id from an endpoint pair.
pub fn edge_id(source: &str, target: &str) -> String {
    format!("{source}~{target}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Rendered polyline path. Empty until computed; never longer than [`EDGE_WAYPOINTS_CAP`].
    pub points: Vec<Point>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: edge_id(&source, &target),
            source,
            target,
            points: Vec::new(),
        }
    }

    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A fully positioned snapshot of the topology.
///
/// `graph_width`/`graph_height` are the engine's native canvas size; `width`/`height` are the
/// final renderable size, grown to also contain the degree-0 node grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    pub nodes: IndexMap<String, Node>,
    pub edges: IndexMap<String, Edge>,
    pub width: f64,
    pub height: f64,
    pub graph_width: f64,
    pub graph_height: f64,
}

impl Layout {
    /// Builds a layout from caller-supplied node/edge sets, recomputing every node degree from
    /// the accompanying edges. Edges referencing missing nodes are kept; downstream consumers
    /// tolerate them by leaving their paths unset.
    pub fn from_parts(nodes: &[Node], edges: &[Edge]) -> Self {
        let mut out = Self::default();
        for n in nodes {
            let mut n = n.clone();
            n.degree = 0;
            out.nodes.insert(n.id.clone(), n);
        }
        for e in edges {
            out.edges.insert(e.id.clone(), e.clone());
        }
        out.recompute_degrees();
        out
    }

    pub fn recompute_degrees(&mut self) {
        for n in self.nodes.values_mut() {
            n.degree = 0;
        }
        let endpoints: Vec<(String, String)> = self
            .edges
            .values()
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect();
        for (source, target) in endpoints {
            if let Some(n) = self.nodes.get_mut(&source) {
                n.degree += 1;
            }
            if let Some(n) = self.nodes.get_mut(&target) {
                n.degree += 1;
            }
        }
    }

    pub fn connected_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.degree > 0)
    }

    pub fn single_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.degree == 0)
    }
}

/// Extra space reserved on the left/top of the canvas when no connected layout exists to anchor
/// the degree-0 node grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degrees_count_both_endpoints_and_self_loops() {
        let nodes = vec![Node::new("a"), Node::new("b"), Node::new("c")];
        let edges = vec![Edge::new("a", "b"), Edge::new("c", "c")];
        let layout = Layout::from_parts(&nodes, &edges);

        assert_eq!(layout.nodes["a"].degree, 1);
        assert_eq!(layout.nodes["b"].degree, 1);
        assert_eq!(layout.nodes["c"].degree, 2);
    }

    #[test]
    fn edges_to_missing_nodes_are_kept_but_do_not_count() {
        let nodes = vec![Node::new("a")];
        let edges = vec![Edge::new("a", "ghost")];
        let layout = Layout::from_parts(&nodes, &edges);

        assert_eq!(layout.nodes["a"].degree, 1);
        assert!(layout.edges.contains_key(&edge_id("a", "ghost")));
    }
}
