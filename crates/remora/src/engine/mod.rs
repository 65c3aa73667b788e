//! Boundary to the external graph layout solver.
//!
//! The solver is a black box behind [`LayoutEngine`]: a persistent, mutable graph of sized nodes
//! and directed edges that can be re-run after incremental insertions/removals, letting the
//! solver warm-start from its previous state instead of rebuilding from scratch. One instance is
//! owned per topology cache entry and never shared.

pub mod layered;

use std::collections::BTreeMap;

use crate::model::Point;

pub use layered::LayeredEngine;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("layout solver failed: {message}")]
    Solver { message: String },
}

/// Per-edge constraints passed on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeOptions {
    /// Minimum number of rank hops between the endpoints; 0 leaves the hop count to the
    /// solver's own default. Self-loop edges are inserted with an explicit hop so the solver
    /// routes a visible loop instead of collapsing it.
    pub minlen: usize,
}

/// Global separation constraints for one solver run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConstraints {
    pub node_separation: f64,
    pub rank_separation: f64,
}

/// Raw solver output: per-node centers and ranks, per-edge polyline waypoints, and the native
/// canvas size. Keyed with `BTreeMap` so downstream iteration is deterministic.
#[derive(Debug, Clone, Default)]
pub struct EngineLayout {
    pub positions: BTreeMap<String, Point>,
    pub ranks: BTreeMap<String, i32>,
    pub paths: BTreeMap<(String, String), Vec<Point>>,
    pub width: f64,
    pub height: f64,
}

pub trait LayoutEngine {
    fn add_node(&mut self, id: &str, width: f64, height: f64);
    fn remove_node(&mut self, id: &str);
    fn add_edge(&mut self, source: &str, target: &str, options: EdgeOptions);
    fn remove_edge(&mut self, source: &str, target: &str);

    fn has_node(&self, id: &str) -> bool;
    fn has_edge(&self, source: &str, target: &str) -> bool;
    fn node_ids(&self) -> Vec<String>;
    fn edge_keys(&self) -> Vec<(String, String)>;

    /// Runs the solver against the graph as currently mutated.
    fn run(&mut self, constraints: &EngineConstraints) -> Result<EngineLayout>;
}
