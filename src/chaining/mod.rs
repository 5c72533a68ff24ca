//! Greedy chaining of seed segments.
//!
//! Segments of one (query, target, frame) task are loaded into a
//! [`DiagGraph`](graph::DiagGraph), capped, sorted and pruned. A forward pass
//! over the target links each node to its plausible predecessors and records
//! the best path scores; backtrace then reads the chains off the graph.

pub mod aligner;
pub mod approx;
pub mod backtrace;
pub mod graph;
pub mod link;
pub mod segment;

use std::collections::BTreeMap;

pub use aligner::{ChainAligner, ChainOutput};
pub use approx::{Anchor, ApproxHsp};
pub use graph::{DiagGraph, DiagonalNode, Edge};
pub use segment::DiagonalSegment;

use crate::common::Loc;

/// Reusable state of the chain builder. One per worker thread.
#[derive(Debug, Default)]
pub struct ChainScratch {
    pub graph: DiagGraph,
    /// Most recent node per diagonal during the forward pass
    pub(crate) window: BTreeMap<Loc, u32>,
    pub(crate) window_keys: Vec<(Loc, u32)>,
}

impl ChainScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scratch whose graph refuses to hold more than `limit` edges.
    pub fn with_edge_limit(limit: usize) -> Self {
        Self {
            graph: DiagGraph::with_edge_limit(limit),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.graph.clear();
        self.window.clear();
        self.window_keys.clear();
    }
}
