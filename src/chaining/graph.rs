//! Diagonal segment graph: node and edge arenas for one chaining pass.
//!
//! Nodes are the seed segments of one (query, target, frame) task. Edges are
//! stored in a single arena in which the incoming edges of every node form a
//! contiguous run ending at the node's `link_idx`. Runs are laid out in node
//! index order, so inserting an edge for node `n` shifts the runs of all
//! later initialised nodes by one.

use log::trace;

use crate::chaining::segment::DiagonalSegment;
use crate::common::{Loc, Score};
use crate::error::{AlignError, Result};

/// `link_idx` of a node whose edge run has not been started.
pub const NO_LINK: i32 = -1;

/// Graph-resident segment with its best path bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagonalNode {
    pub seg: DiagonalSegment,
    /// End of this node's edge run in the edge arena, or [`NO_LINK`].
    pub link_idx: i32,
    /// Best score of any path ending in this node.
    pub prefix_score: Score,
    /// Highest prefix score along that path.
    pub path_max: Score,
    /// Lowest prefix score along that path.
    pub path_min: Score,
}

impl From<DiagonalSegment> for DiagonalNode {
    fn from(seg: DiagonalSegment) -> Self {
        Self {
            seg,
            link_idx: NO_LINK,
            prefix_score: seg.score,
            path_max: seg.score,
            path_min: seg.score,
        }
    }
}

impl DiagonalNode {
    /// Score gained since the lowest point of the best path.
    #[inline]
    pub fn rel_score(&self) -> Score {
        if self.prefix_score == self.path_max {
            self.prefix_score
        } else {
            self.prefix_score - self.path_min
        }
    }
}

/// `node_out` reaches `node_in` with `prefix_score`, usable for lookups
/// with a target cutoff greater than `cutoff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub prefix_score: Score,
    pub path_max: Score,
    pub path_min: Score,
    /// Prefix score accumulated before entering `node_in`.
    pub prefix_score_begin: Score,
    /// Target coordinate where the path enters `node_in`.
    pub cutoff: Loc,
    pub node_in: u32,
    pub node_out: u32,
}

#[derive(Debug, Clone)]
pub struct DiagGraph {
    pub nodes: Vec<DiagonalNode>,
    pub edges: Vec<Edge>,
    staging: Vec<DiagonalSegment>,
    keep: Vec<bool>,
    prune_window: Vec<u32>,
    edge_limit: usize,
}

impl Default for DiagGraph {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            staging: Vec::new(),
            keep: Vec::new(),
            prune_window: Vec::new(),
            edge_limit: i32::MAX as usize,
        }
    }
}

impl DiagGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph that refuses to grow beyond `limit` edges.
    pub fn with_edge_limit(limit: usize) -> Self {
        Self {
            edge_limit: limit.min(i32::MAX as usize),
            ..Self::default()
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Replace the graph contents with `segments`.
    ///
    /// Empty segments are skipped. The rest are grouped by diagonal and
    /// visited in target order; a
    /// segment whose target end does not pass the furthest end seen so far on
    /// its diagonal is dominated and dropped.
    pub fn load(&mut self, segments: &[DiagonalSegment]) {
        self.clear();
        self.staging.clear();
        self.staging.extend_from_slice(segments);
        self.staging.sort_by(DiagonalSegment::cmp_diag);

        let mut diag = Loc::MIN;
        let mut max_target_end = Loc::MIN;
        for seg in self.staging.iter().filter(|s| s.len > 0) {
            if seg.diag() != diag {
                diag = seg.diag();
                max_target_end = seg.target_end();
                self.nodes.push(DiagonalNode::from(*seg));
            } else if seg.target_end() > max_target_end {
                max_target_end = seg.target_end();
                self.nodes.push(DiagonalNode::from(*seg));
            }
        }
    }

    /// Order nodes by target, then query coordinate.
    pub fn sort(&mut self) {
        self.nodes.sort_by(|a, b| a.seg.cmp_target(&b.seg));
    }

    /// Remove nodes covered by more than `range_cover` open nodes that start
    /// no later, end no earlier and score at least as high on the target.
    ///
    /// Expects target-sorted nodes and keeps their relative order. Returns the
    /// number of nodes removed.
    pub fn prune(&mut self, range_cover: usize) -> usize {
        let n = self.nodes.len();
        self.keep.clear();
        self.keep.resize(n, false);
        self.prune_window.clear();

        for k in 0..n {
            let d = self.nodes[k].seg;
            let mut covering = 0;
            let nodes = &self.nodes;
            self.prune_window.retain(|&w| {
                let e = &nodes[w as usize].seg;
                if e.target_end() > d.target_start {
                    if e.score >= d.score
                        && e.target_start <= d.target_start
                        && e.target_end() >= d.target_end()
                    {
                        covering += 1;
                    }
                    true
                } else {
                    false
                }
            });
            if covering <= range_cover {
                self.keep[k] = true;
                self.prune_window.push(k as u32);
            }
        }

        let keep = &self.keep;
        let mut k = 0;
        self.nodes.retain(|_| {
            let kept = keep[k];
            k += 1;
            kept
        });
        let removed = n - self.nodes.len();
        if removed > 0 {
            trace!("prune removed {} of {} nodes", removed, n);
        }
        removed
    }

    /// Open the edge run of `node` at the current end of the arena.
    pub fn init_node(&mut self, node: usize) -> Result<()> {
        if self.edges.len() >= self.edge_limit {
            return Err(AlignError::TooManyEdges {
                limit: self.edge_limit,
            });
        }
        self.nodes[node].link_idx = self.edges.len() as i32;
        Ok(())
    }

    /// First index of the edge run of `node`.
    fn run_start(&self, node: usize) -> usize {
        let end = self.nodes[node].link_idx.max(0) as usize;
        let mut start = end;
        while start > 0 && self.edges[start - 1].node_in as usize == node {
            start -= 1;
        }
        start
    }

    /// Insert `edge` into the run of `edge.node_in`, keeping the run sorted by
    /// decreasing prefix score, and update the node's best path.
    pub fn add_edge(&mut self, edge: Edge) -> Result<usize> {
        if self.edges.len() >= self.edge_limit {
            return Err(AlignError::TooManyEdges {
                limit: self.edge_limit,
            });
        }
        let node_in = edge.node_in as usize;
        debug_assert!(self.nodes[node_in].link_idx >= 0);
        debug_assert!(self.nodes[node_in].link_idx as usize <= self.edges.len());

        for later in &mut self.nodes[node_in + 1..] {
            if later.link_idx == NO_LINK {
                break;
            }
            later.link_idx += 1;
        }

        let start = self.run_start(node_in);
        let d = &mut self.nodes[node_in];
        let end = d.link_idx as usize;
        if edge.prefix_score > d.prefix_score {
            d.prefix_score = edge.prefix_score;
            d.path_max = edge.path_max;
            d.path_min = edge.path_min;
        }
        let pos = start
            + self.edges[start..end]
                .iter()
                .take_while(|e| e.prefix_score >= edge.prefix_score)
                .count();
        d.link_idx += 1;
        self.edges.insert(pos, edge);
        Ok(pos)
    }

    /// Incoming edges of `node`, best first.
    pub fn edge_run(&self, node: usize) -> &[Edge] {
        let end = self.nodes[node].link_idx;
        if end <= 0 {
            return &[];
        }
        &self.edges[self.run_start(node)..end as usize]
    }

    /// Best incoming edge of `node` entering before target coordinate
    /// `cutoff` and improving on the node's own score.
    pub fn get_edge(&self, node: usize, cutoff: Loc) -> Option<usize> {
        let d = &self.nodes[node];
        if d.link_idx <= 0 {
            return None;
        }
        let start = self.run_start(node);
        let end = d.link_idx as usize;
        (start..end)
            .find(|&k| self.edges[k].cutoff < cutoff)
            .filter(|&k| self.edges[k].prefix_score > d.seg.score)
    }

    /// Best prefix score of `node` usable before `cutoff`, with its path
    /// maximum and minimum.
    pub fn prefix_score(&self, node: usize, cutoff: Loc) -> (Score, Score, Score) {
        let score = self.nodes[node].seg.score;
        match self.get_edge(node, cutoff) {
            Some(k) => {
                let e = &self.edges[k];
                (score.max(e.prefix_score), score.max(e.path_max), e.path_min)
            }
            None => (score, score, score),
        }
    }
}
