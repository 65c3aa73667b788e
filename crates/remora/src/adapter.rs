//! Translation layer between the internal graph model and the solver behind [`LayoutEngine`].
//!
//! The solver graph is long-lived: each call diffs the current node/edge sets against it and
//! applies incremental insertions/removals instead of rebuilding, so the solver can warm-start
//! from its previous state. Degree-0 nodes never enter the solver; they are grid-placed after
//! the run.

use rustc_hash::FxHashSet;

use crate::engine::{self, EdgeOptions, EngineConstraints, LayoutEngine};
use crate::geom::correct_edge_path;
use crate::model::{
    Layout, Margins, NODE_FOOTPRINT, NODE_SEPARATION, RANK_SEPARATION, edge_id,
};
use crate::strategy::place_single_nodes;

/// Runs a full, independent re-layout. The only path that derives coordinates from scratch;
/// every incremental strategy eventually falls back to it.
pub fn run_engine_layout(
    engine: &mut dyn LayoutEngine,
    layout: &mut Layout,
    margins: Margins,
) -> engine::Result<()> {
    sync_engine(engine, layout);

    let result = engine.run(&EngineConstraints {
        node_separation: NODE_SEPARATION,
        rank_separation: RANK_SEPARATION,
    })?;

    for (id, position) in &result.positions {
        if let Some(node) = layout.nodes.get_mut(id) {
            node.x = position.x;
            node.y = position.y;
        }
    }
    for (id, rank) in &result.ranks {
        if let Some(node) = layout.nodes.get_mut(id) {
            node.rank = Some(*rank);
        }
    }

    for ((source, target), raw) in &result.paths {
        let (Some(s), Some(t)) = (layout.nodes.get(source), layout.nodes.get(target)) else {
            continue;
        };
        let (source_center, target_center) = (s.center(), t.center());
        if let Some(edge) = layout.edges.get_mut(&edge_id(source, target)) {
            edge.points =
                correct_edge_path(raw, source_center, target_center, source == target);
        }
    }

    layout.graph_width = result.width;
    layout.graph_height = result.height;
    layout.width = result.width;
    layout.height = result.height;

    place_single_nodes(layout, margins);
    Ok(())
}

/// Diffs the current sets against the persistent solver graph.
fn sync_engine(engine: &mut dyn LayoutEngine, layout: &Layout) {
    let connected: FxHashSet<&str> = layout.connected_nodes().map(|n| n.id.as_str()).collect();

    for id in &connected {
        if !engine.has_node(id) {
            // Oversized footprint: curved edge paths must not clip through node bodies.
            engine.add_node(id, NODE_FOOTPRINT, NODE_FOOTPRINT);
        }
    }
    for id in engine.node_ids() {
        if !connected.contains(id.as_str()) {
            engine.remove_node(&id);
        }
    }

    for edge in layout.edges.values() {
        if !connected.contains(edge.source.as_str()) || !connected.contains(edge.target.as_str())
        {
            continue;
        }
        if !engine.has_edge(&edge.source, &edge.target) {
            let mut options = EdgeOptions::default();
            if edge.is_loop() {
                // A self-loop collapses to nothing without an explicit rank hop.
                options.minlen = 1;
            }
            engine.add_edge(&edge.source, &edge.target, options);
        }
    }
    for (source, target) in engine.edge_keys() {
        if !layout.edges.contains_key(&edge_id(&source, &target)) {
            engine.remove_edge(&source, &target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineLayout, LayeredEngine};
    use crate::model::{EDGE_WAYPOINTS_CAP, Edge, Node};

    fn graph(node_ids: &[&str], edges: &[(&str, &str)]) -> Layout {
        let nodes: Vec<Node> = node_ids.iter().map(|id| Node::new(*id)).collect();
        let edges: Vec<Edge> = edges.iter().map(|(s, t)| Edge::new(*s, *t)).collect();
        Layout::from_parts(&nodes, &edges)
    }

    #[test]
    fn full_layout_places_nodes_and_corrects_edge_paths() {
        let mut engine = LayeredEngine::new();
        let mut layout = graph(&["a", "b"], &[("a", "b")]);

        run_engine_layout(&mut engine, &mut layout, Margins::default()).unwrap();

        let a = &layout.nodes["a"];
        let b = &layout.nodes["b"];
        assert_eq!(a.rank, Some(0));
        assert_eq!(b.rank, Some(1));
        assert!(b.y > a.y);

        let edge = &layout.edges[&edge_id("a", "b")];
        assert!(edge.points.len() <= EDGE_WAYPOINTS_CAP);
        assert_eq!(edge.points[0], a.center());
        assert_eq!(*edge.points.last().unwrap(), b.center());
        assert!(layout.graph_height > 0.0);
    }

    #[test]
    fn degree_zero_nodes_stay_out_of_the_solver() {
        let mut engine = LayeredEngine::new();
        let mut layout = graph(&["a", "b", "lonely"], &[("a", "b")]);

        run_engine_layout(&mut engine, &mut layout, Margins::default()).unwrap();

        assert!(!engine.has_node("lonely"));
        // But the node still got grid-placed.
        let lonely = &layout.nodes["lonely"];
        assert!(lonely.x != 0.0 || lonely.y != 0.0);
    }

    #[test]
    fn engine_graph_tracks_removals_across_calls() {
        let mut engine = LayeredEngine::new();
        let mut first = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        run_engine_layout(&mut engine, &mut first, Margins::default()).unwrap();
        assert!(engine.has_node("c"));

        // `c` disappears; `b` loses an edge but stays connected.
        let mut second = graph(&["a", "b"], &[("a", "b")]);
        run_engine_layout(&mut engine, &mut second, Margins::default()).unwrap();

        assert!(!engine.has_node("c"));
        assert!(!engine.has_edge("b", "c"));
        assert!(engine.has_edge("a", "b"));
    }

    #[test]
    fn node_dropping_to_degree_zero_is_evicted_from_the_solver() {
        let mut engine = LayeredEngine::new();
        let mut first = graph(&["a", "b"], &[("a", "b")]);
        run_engine_layout(&mut engine, &mut first, Margins::default()).unwrap();

        let mut second = graph(&["a", "b"], &[]);
        run_engine_layout(&mut engine, &mut second, Margins::default()).unwrap();

        assert!(!engine.has_node("a"));
        assert!(!engine.has_node("b"));
    }

    #[test]
    fn only_self_loops_carry_an_explicit_rank_hop() {
        #[derive(Default)]
        struct OptionRecorder {
            inner: LayeredEngine,
            added: Vec<((String, String), EdgeOptions)>,
        }

        impl LayoutEngine for OptionRecorder {
            fn add_node(&mut self, id: &str, width: f64, height: f64) {
                self.inner.add_node(id, width, height);
            }
            fn remove_node(&mut self, id: &str) {
                self.inner.remove_node(id);
            }
            fn add_edge(&mut self, source: &str, target: &str, options: EdgeOptions) {
                self.added
                    .push(((source.to_string(), target.to_string()), options));
                self.inner.add_edge(source, target, options);
            }
            fn remove_edge(&mut self, source: &str, target: &str) {
                self.inner.remove_edge(source, target);
            }
            fn has_node(&self, id: &str) -> bool {
                self.inner.has_node(id)
            }
            fn has_edge(&self, source: &str, target: &str) -> bool {
                self.inner.has_edge(source, target)
            }
            fn node_ids(&self) -> Vec<String> {
                self.inner.node_ids()
            }
            fn edge_keys(&self) -> Vec<(String, String)> {
                self.inner.edge_keys()
            }
            fn run(&mut self, constraints: &EngineConstraints) -> crate::engine::Result<EngineLayout> {
                self.inner.run(constraints)
            }
        }

        let mut engine = OptionRecorder::default();
        let mut layout = graph(&["a", "b", "c"], &[("a", "b"), ("c", "c")]);

        run_engine_layout(&mut engine, &mut layout, Margins::default()).unwrap();

        let minlen_of = |s: &str, t: &str| {
            engine
                .added
                .iter()
                .find(|((source, target), _)| source == s && target == t)
                .map(|(_, o)| o.minlen)
        };
        assert_eq!(minlen_of("a", "b"), Some(0));
        assert_eq!(minlen_of("c", "c"), Some(1));
    }

    #[test]
    fn self_loop_paths_start_and_end_on_the_node_center() {
        let mut engine = LayeredEngine::new();
        let mut layout = graph(&["a"], &[("a", "a")]);

        run_engine_layout(&mut engine, &mut layout, Margins::default()).unwrap();

        let center = layout.nodes["a"].center();
        let edge = &layout.edges[&edge_id("a", "a")];
        assert!(edge.points.len() <= EDGE_WAYPOINTS_CAP);
        assert_eq!(edge.points[0], center);
        assert_eq!(*edge.points.last().unwrap(), center);
    }
}
