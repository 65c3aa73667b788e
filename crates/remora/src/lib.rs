#![forbid(unsafe_code)]

//! Incremental layout caching for live topology graphs.
//!
//! A topology view gains and loses nodes and edges over time; re-running a full layout solver on
//! every snapshot is wasteful and makes the picture jump. `remora` classifies each snapshot
//! against the previous one and picks the cheapest safe update: a pure position copy, grid
//! placement for new isolated nodes, lateral insertion for new nodes that fit an existing rank,
//! or a full solver run. A post-hoc overlap check re-derives the layout from scratch whenever an
//! incremental shortcut turns out to be visually wrong.
//!
//! The solver itself is a collaborator behind [`engine::LayoutEngine`]; a small built-in layered
//! implementation ([`engine::LayeredEngine`]) is used unless the caller plugs in another.

pub mod adapter;
pub mod cache;
pub mod classify;
pub mod controller;
pub mod engine;
pub mod geom;
pub mod model;
pub mod strategy;

pub use cache::{CacheStore, EdgeCache, NodeCache, NodePosition, TopologyCache};
pub use classify::{StrategyGates, UpdateKind};
pub use controller::{
    AllEnabled, FeatureGate, LayoutController, LayoutOptions, NoopTelemetry, StrategyFlag,
    TelemetrySink,
};
pub use engine::{EngineConstraints, EngineError, EngineLayout, LayeredEngine, LayoutEngine};
pub use model::{Edge, Layout, Margins, Node, Point, edge_id, point};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
