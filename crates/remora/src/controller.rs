//! Top-level decision state machine.
//!
//! One call: load (or create) the topology's cache entry, classify the snapshot against it,
//! run the selected strategy, apply the overlap safety net, commit the result. Collaborators
//! (telemetry, feature flags) are advisory only; nothing they do can invalidate computed
//! coordinates.

use serde_json::Value;

use crate::adapter::run_engine_layout;
use crate::cache::{CacheStore, EdgeCache, NodeCache, topology_key};
use crate::classify::{StrategyGates, UpdateKind, classify};
use crate::engine::{LayeredEngine, LayoutEngine};
use crate::geom::min_pairwise_distance;
use crate::model::{Edge, Layout, MIN_NODE_DISTANCE, Margins, Node, Point};
use crate::strategy::{
    fill_missing_edge_paths, position_copy, same_rank_insertion, single_node_placement,
};

/// Telemetry event emitted when an incremental strategy produced overlapping nodes and the
/// layout was re-derived from scratch.
pub const OVERLAP_RELAYOUT_EVENT: &str = "layout.overlap_relayout";

/// Fire-and-forget event sink. Implementations must not fail the call; there is nothing to
/// return and nothing the layout pipeline would do with a failure.
pub trait TelemetrySink {
    fn emit(&self, event: &str);
}

/// Default sink: drop everything.
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn emit(&self, _event: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyFlag {
    SingleNodePlacement,
    SameRankInsertion,
}

/// Boolean feature-flag source gating the incremental strategies. When a flag is off the
/// classifier skips that branch and the case falls through to a full re-layout.
pub trait FeatureGate {
    fn enabled(&self, flag: StrategyFlag) -> bool;
}

/// Default gate: everything on.
pub struct AllEnabled;

impl FeatureGate for AllEnabled {
    fn enabled(&self, _flag: StrategyFlag) -> bool {
        true
    }
}

pub type EngineFactory = Box<dyn Fn() -> Box<dyn LayoutEngine>>;

/// Per-call options.
#[derive(Default)]
pub struct LayoutOptions {
    /// Together with `topology_options`, derives the cache key.
    pub topology_id: String,
    pub topology_options: Value,
    /// Drop any stored cache for this topology before laying out.
    pub no_cache: bool,
    /// Skip every incremental strategy.
    pub force_relayout: bool,
    /// Caller-supplied cache overrides (testing, multi-instance scenarios). Applied on top of
    /// the stored entry before classification.
    pub cached_layout: Option<Layout>,
    pub node_cache: Option<NodeCache>,
    pub edge_cache: Option<EdgeCache>,
    pub margins: Margins,
}

impl LayoutOptions {
    pub fn for_topology(topology_id: impl Into<String>) -> Self {
        Self {
            topology_id: topology_id.into(),
            ..Default::default()
        }
    }
}

/// Owns the cache store and the collaborator handles. One controller serves any number of
/// topologies; callers must not run two calls for the same topology concurrently (the cache
/// entry is a single-writer mutable handle, enforced here by `&mut self`).
pub struct LayoutController {
    store: CacheStore,
    engine_factory: EngineFactory,
    telemetry: Box<dyn TelemetrySink>,
    flags: Box<dyn FeatureGate>,
}

impl Default for LayoutController {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutController {
    pub fn new() -> Self {
        Self {
            store: CacheStore::new(),
            engine_factory: Box::new(|| Box::new(LayeredEngine::new())),
            telemetry: Box::new(NoopTelemetry),
            flags: Box::new(AllEnabled),
        }
    }

    pub fn with_engine_factory(mut self, factory: EngineFactory) -> Self {
        self.engine_factory = factory;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Box<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn with_feature_gate(mut self, flags: Box<dyn FeatureGate>) -> Self {
        self.flags = flags;
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Drops the cache entry for one topology configuration.
    pub fn invalidate(&mut self, topology_id: &str, topology_options: &Value) -> bool {
        self.store.evict(&topology_key(topology_id, topology_options))
    }

    /// Computes a layout for the current node/edge sets. Returns `None` for an empty node set.
    pub fn layout(
        &mut self,
        nodes: &[Node],
        edges: &[Edge],
        options: &LayoutOptions,
    ) -> Option<Layout> {
        if nodes.is_empty() {
            return None;
        }

        let key = topology_key(&options.topology_id, &options.topology_options);
        if options.no_cache {
            self.store.evict(&key);
        }
        let factory = &self.engine_factory;
        let entry = self.store.get_or_insert_with(&key, || factory());

        if let Some(layout) = &options.cached_layout {
            entry.layout = Some(layout.clone());
        }
        if let Some(node_cache) = &options.node_cache {
            entry.node_cache = node_cache.clone();
        }
        if let Some(edge_cache) = &options.edge_cache {
            entry.edge_cache = edge_cache.clone();
        }

        let mut current = Layout::from_parts(nodes, edges);
        if let Some(previous) = &entry.layout {
            current.width = previous.width;
            current.height = previous.height;
            current.graph_width = previous.graph_width;
            current.graph_height = previous.graph_height;
        }

        let gates = StrategyGates {
            single_node: self.flags.enabled(StrategyFlag::SingleNodePlacement),
            same_rank: self.flags.enabled(StrategyFlag::SameRankInsertion),
        };
        let kind = if options.force_relayout {
            UpdateKind::Full
        } else {
            classify(&current.nodes, &current.edges, &entry.node_cache, gates)
        };
        tracing::debug!(topology = %key, strategy = ?kind, "selected layout strategy");

        match kind {
            UpdateKind::PositionCopy => {
                position_copy(&mut current, &entry.node_cache, &entry.edge_cache);
            }
            UpdateKind::SingleNode => {
                single_node_placement(
                    &mut current,
                    &entry.node_cache,
                    &entry.edge_cache,
                    options.margins,
                );
            }
            UpdateKind::SameRank => {
                same_rank_insertion(
                    &mut current,
                    &entry.node_cache,
                    &entry.edge_cache,
                    options.margins,
                );
            }
            UpdateKind::Full => {
                if let Err(err) =
                    run_engine_layout(entry.engine.as_mut(), &mut current, options.margins)
                {
                    tracing::warn!(topology = %key, error = %err, "layout solver failed; returning last committed layout");
                    return entry.layout.clone();
                }
            }
        }

        // Safety net: the incremental strategies are deliberately approximate, so bound their
        // worst visible consequence. Overlapping centers mean the approximation was wrong;
        // re-derive everything from the solver.
        if kind != UpdateKind::Full && has_overlap(&current) {
            self.telemetry.emit(OVERLAP_RELAYOUT_EVENT);
            tracing::debug!(topology = %key, "node overlap after incremental strategy; forcing full re-layout");
            if let Err(err) =
                run_engine_layout(entry.engine.as_mut(), &mut current, options.margins)
            {
                tracing::warn!(topology = %key, error = %err, "layout solver failed; returning last committed layout");
                return entry.layout.clone();
            }
        }

        fill_missing_edge_paths(&mut current);
        entry.commit(&current);
        Some(current)
    }
}

fn has_overlap(layout: &Layout) -> bool {
    let centers: Vec<Point> = layout.nodes.values().map(|n| n.center()).collect();
    min_pairwise_distance(&centers).is_some_and(|d| d < MIN_NODE_DISTANCE)
}
