//! Built-in layered solver.
//!
//! A deliberately small default implementation of [`LayoutEngine`]: longest-path ranking,
//! insertion-ordered row packing and polyline edge routing. It exists so the crate works out of
//! the box and so integration tests exercise the real adapter path; callers with a heavier
//! solver plug it in behind the same trait.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{EdgeOptions, EngineConstraints, EngineLayout, LayoutEngine, Result};
use crate::model::{Point, point};

#[derive(Debug, Clone, Copy)]
struct NodeState {
    width: f64,
    height: f64,
}

/// Persistent solver graph. Insertion order is kept (via `IndexMap`) so repeated runs over an
/// unchanged graph are deterministic and incremental additions extend rows on the right.
#[derive(Default)]
pub struct LayeredEngine {
    nodes: IndexMap<String, NodeState>,
    edges: IndexMap<(String, String), EdgeOptions>,
}

impl LayeredEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn compute_ranks(&self) -> FxHashMap<&str, i32> {
        let mut preds: FxHashMap<&str, Vec<(&str, usize)>> = FxHashMap::default();
        for ((source, target), opts) in &self.edges {
            if source == target {
                continue;
            }
            if !self.nodes.contains_key(source) || !self.nodes.contains_key(target) {
                continue;
            }
            // minlen 0 means unconstrained; this engine's default is one hop per edge.
            preds
                .entry(target.as_str())
                .or_default()
                .push((source.as_str(), opts.minlen.max(1)));
        }

        fn rank_of<'a>(
            id: &'a str,
            preds: &FxHashMap<&'a str, Vec<(&'a str, usize)>>,
            memo: &mut FxHashMap<&'a str, i32>,
            visiting: &mut FxHashSet<&'a str>,
        ) -> i32 {
            if let Some(&r) = memo.get(id) {
                return r;
            }
            // Back edge of a cycle: rank it as a source instead of recursing forever.
            if !visiting.insert(id) {
                return 0;
            }
            let r = preds
                .get(id)
                .into_iter()
                .flatten()
                .map(|(p, minlen)| rank_of(p, preds, memo, visiting) + *minlen as i32)
                .max()
                .unwrap_or(0);
            visiting.remove(id);
            memo.insert(id, r);
            r
        }

        let mut memo = FxHashMap::default();
        let mut visiting = FxHashSet::default();
        for id in self.nodes.keys() {
            rank_of(id.as_str(), &preds, &mut memo, &mut visiting);
        }
        memo
    }
}

impl LayoutEngine for LayeredEngine {
    fn add_node(&mut self, id: &str, width: f64, height: f64) {
        self.nodes.insert(id.to_string(), NodeState { width, height });
    }

    fn remove_node(&mut self, id: &str) {
        self.nodes.shift_remove(id);
        self.edges.retain(|(s, t), _| s != id && t != id);
    }

    fn add_edge(&mut self, source: &str, target: &str, options: EdgeOptions) {
        self.edges
            .insert((source.to_string(), target.to_string()), options);
    }

    fn remove_edge(&mut self, source: &str, target: &str) {
        self.edges
            .shift_remove(&(source.to_string(), target.to_string()));
    }

    fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges
            .contains_key(&(source.to_string(), target.to_string()))
    }

    fn node_ids(&self) -> Vec<String> {
        self.nodes.keys().cloned().collect()
    }

    fn edge_keys(&self) -> Vec<(String, String)> {
        self.edges.keys().cloned().collect()
    }

    fn run(&mut self, constraints: &EngineConstraints) -> Result<EngineLayout> {
        let mut out = EngineLayout::default();
        if self.nodes.is_empty() {
            return Ok(out);
        }

        let ranks = self.compute_ranks();

        // Group nodes per rank, keeping insertion order within each row.
        let mut rows: IndexMap<i32, Vec<&str>> = IndexMap::new();
        for id in self.nodes.keys() {
            let r = ranks.get(id.as_str()).copied().unwrap_or(0);
            rows.entry(r).or_default().push(id.as_str());
        }
        rows.sort_keys();

        let mut y_cursor = 0.0_f64;
        let mut width = 0.0_f64;
        for (rank, ids) in &rows {
            let row_height = ids
                .iter()
                .filter_map(|id| self.nodes.get(*id))
                .map(|n| n.height)
                .fold(0.0_f64, f64::max);
            let y = y_cursor + row_height / 2.0;

            let mut x_cursor = 0.0_f64;
            for id in ids {
                let Some(n) = self.nodes.get(*id) else { continue };
                out.positions.insert(id.to_string(), point(x_cursor + n.width / 2.0, y));
                out.ranks.insert(id.to_string(), *rank);
                x_cursor += n.width + constraints.node_separation;
            }
            width = width.max(x_cursor - constraints.node_separation);
            y_cursor += row_height + constraints.rank_separation;
        }
        out.width = width;
        out.height = y_cursor - constraints.rank_separation;

        for (source, target) in self.edges.keys() {
            let (Some(&sc), Some(&tc)) = (
                out.positions.get(source.as_str()),
                out.positions.get(target.as_str()),
            ) else {
                continue;
            };
            let raw = if source == target {
                self_loop_path(sc, self.nodes[source.as_str()].width)
            } else {
                segment_path(sc, tc, self.nodes[target.as_str()].height)
            };
            out.paths.insert((source.clone(), target.clone()), raw);
        }

        Ok(out)
    }
}

/// Routes a loop out of the node's right side and back. First and last points sit on the node
/// center; path correction later pins them there exactly.
fn self_loop_path(center: Point, width: f64) -> Vec<Point> {
    let r = width / 2.0;
    vec![
        center,
        point(center.x + r, center.y - r / 2.0),
        point(center.x + 2.0 * r, center.y),
        point(center.x + r, center.y + r / 2.0),
        center,
    ]
}

/// Straight route from the source center to a point on the target boundary. The last waypoint is
/// the target-entrance point, which path correction consumes for arrowhead placement.
fn segment_path(source: Point, target: Point, target_height: f64) -> Vec<Point> {
    let dx = target.x - source.x;
    let dy = target.y - source.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len == 0.0 {
        return vec![source, target];
    }
    let half = target_height / 2.0;
    let entrance = point(target.x - dx / len * half, target.y - dy / len * half);
    let mid = point((source.x + entrance.x) / 2.0, (source.y + entrance.y) / 2.0);
    vec![source, mid, entrance]
}
