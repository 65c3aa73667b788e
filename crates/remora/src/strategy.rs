//! Incremental placement strategies: position-copy, degree-0 grid placement and same-rank
//! lateral insertion. Each produces a candidate layout from cached coordinates; the controller's
//! overlap safety net bounds the damage when an approximation turns out wrong.

use rustc_hash::FxHashMap;

use crate::cache::{EdgeCache, NodeCache};
use crate::geom::straight_path;
use crate::model::{
    Layout, Margins, NODE_FOOTPRINT, NODE_SEPARATION, Point, RANK_SEPARATION,
};

/// Overwrites layout-relevant fields from the caches: `x`/`y`/`rank` for cached nodes, cached
/// `points` for cached edges. A cached edge path is reused only while its recorded endpoints
/// still sit exactly on the (possibly just-copied) current node centers; otherwise the path is
/// recomputed as a straight segment. Entries with no cache hit are left as-is for a later stage.
pub fn position_copy(layout: &mut Layout, node_cache: &NodeCache, edge_cache: &EdgeCache) {
    for node in layout.nodes.values_mut() {
        if let Some(cached) = node_cache.get(&node.id) {
            node.x = cached.x;
            node.y = cached.y;
            node.rank = cached.rank;
        }
    }

    let centers: FxHashMap<String, Point> = layout
        .nodes
        .values()
        .map(|n| (n.id.clone(), n.center()))
        .collect();

    for edge in layout.edges.values_mut() {
        let Some(cached) = edge_cache.get(&edge.id) else {
            continue;
        };
        let (Some(&source), Some(&target)) =
            (centers.get(&edge.source), centers.get(&edge.target))
        else {
            continue;
        };
        let endpoints_match = cached.points.first() == Some(&source)
            && cached.points.last() == Some(&target);
        edge.points = if endpoints_match {
            cached.points.clone()
        } else {
            straight_path(source, target)
        };
    }
}

/// Lays out all degree-0 nodes on a square grid next to (or below) the connected layout, growing
/// the canvas to contain the grid. No degree-0 nodes: no-op.
pub fn place_single_nodes(layout: &mut Layout, margins: Margins) {
    let mut singles: Vec<String> = layout.single_nodes().map(|n| n.id.clone()).collect();
    if singles.is_empty() {
        return;
    }
    // Ascending rank order; unranked nodes go last, ties keep caller order.
    singles.sort_by_key(|id| layout.nodes[id].rank.unwrap_or(i32::MAX));

    let connected: Vec<&crate::model::Node> = layout.connected_nodes().collect();
    let (offset_x, offset_y) = if connected.is_empty() {
        (
            NODE_FOOTPRINT / 2.0 + margins.left,
            NODE_FOOTPRINT / 2.0 + margins.top,
        )
    } else {
        let max_x = connected.iter().map(|n| n.x).fold(f64::NEG_INFINITY, f64::max);
        let min_x = connected.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
        let max_y = connected.iter().map(|n| n.y).fold(f64::NEG_INFINITY, f64::max);
        let min_y = connected.iter().map(|n| n.y).fold(f64::INFINITY, f64::min);
        let aspect = if layout.graph_height == 0.0 {
            1.0
        } else {
            layout.graph_width / layout.graph_height
        };
        if aspect < 1.0 {
            // Taller than wide: grid goes to the right of the connected layout.
            (max_x + NODE_FOOTPRINT + NODE_SEPARATION, min_y)
        } else {
            (min_x, max_y + NODE_FOOTPRINT + RANK_SEPARATION)
        }
    };

    let columns = (singles.len() as f64).sqrt().ceil() as usize;
    let step = NODE_FOOTPRINT + NODE_SEPARATION;
    for (i, id) in singles.iter().enumerate() {
        let node = &mut layout.nodes[id.as_str()];
        node.x = offset_x + (i % columns) as f64 * step;
        node.y = offset_y + (i / columns) as f64 * step;
    }

    let used_columns = singles.len().min(columns);
    let rows = singles.len().div_ceil(columns);
    let grid_max_x = offset_x + (used_columns - 1) as f64 * step;
    let grid_max_y = offset_y + (rows - 1) as f64 * step;
    layout.width = layout
        .width
        .max(grid_max_x + NODE_FOOTPRINT / 2.0 + NODE_SEPARATION);
    layout.height = layout
        .height
        .max(grid_max_y + NODE_FOOTPRINT / 2.0 + NODE_SEPARATION);
}

/// Position-copy followed by grid placement for any degree-0 newcomers.
pub fn single_node_placement(
    layout: &mut Layout,
    node_cache: &NodeCache,
    edge_cache: &EdgeCache,
    margins: Margins,
) {
    position_copy(layout, node_cache, edge_cache);
    place_single_nodes(layout, margins);
}

/// Appends each newly-seen connected node to the right end of its rank's row.
///
/// All cached nodes of one rank are assumed to share a y coordinate; the first match's y is
/// taken as the row position. A rank with no cached node should not get here (the classifier
/// guards it) and leaves the node unplaced rather than guessing.
pub fn same_rank_insertion(
    layout: &mut Layout,
    node_cache: &NodeCache,
    edge_cache: &EdgeCache,
    margins: Margins,
) {
    position_copy(layout, node_cache, edge_cache);

    for node in layout.nodes.values_mut() {
        if node.degree == 0 || node_cache.contains_key(&node.id) {
            continue;
        }
        let Some(rank) = node.rank else { continue };
        let mut row_y: Option<f64> = None;
        let mut row_max_x = f64::NEG_INFINITY;
        for cached in node_cache.values() {
            if cached.rank != Some(rank) {
                continue;
            }
            if row_y.is_none() {
                row_y = Some(cached.y);
            }
            row_max_x = row_max_x.max(cached.x);
        }
        if let Some(y) = row_y {
            node.x = row_max_x + NODE_SEPARATION + NODE_FOOTPRINT;
            node.y = y;
        }
    }

    place_single_nodes(layout, margins);
}

/// Fills a straight path for every edge still lacking one after the strategies ran (new edges
/// have no cache entry to copy from). Edges with a missing endpoint are tolerated and skipped.
pub fn fill_missing_edge_paths(layout: &mut Layout) {
    let centers: FxHashMap<String, Point> = layout
        .nodes
        .values()
        .map(|n| (n.id.clone(), n.center()))
        .collect();
    for edge in layout.edges.values_mut() {
        if !edge.points.is_empty() {
            continue;
        }
        let (Some(&source), Some(&target)) =
            (centers.get(&edge.source), centers.get(&edge.target))
        else {
            continue;
        };
        edge.points = straight_path(source, target);
    }
}
