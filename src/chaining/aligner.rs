//! Forward pass of the chain builder.

use log::{debug, trace};

use crate::align::result::Hsp;
use crate::chaining::approx::ApproxHsp;
use crate::chaining::graph::{DiagGraph, Edge};
use crate::chaining::link::get_link;
use crate::chaining::segment::DiagonalSegment;
use crate::chaining::ChainScratch;
use crate::common::{Letter, Loc, Score};
use crate::config::ChainingConfig;
use crate::diagnostics::{bump, DiagnosticCounters};
use crate::error::{AlignError, Result};
use crate::utils::matrix::ScoreMatrix;

/// Chains found for one task.
#[derive(Debug, Clone, Default)]
pub struct ChainOutput {
    /// Best chain score
    pub max_score: Score,
    pub chains: Vec<ApproxHsp>,
    /// Chain-level alignments, parallel to `chains`, when requested
    pub hsps: Vec<Hsp>,
}

/// Chain builder for one (query, target, frame) task.
pub struct ChainAligner<'a, M: ScoreMatrix> {
    pub(crate) query: &'a [Letter],
    pub(crate) target: &'a [Letter],
    pub(crate) matrix: &'a M,
    pub(crate) config: &'a ChainingConfig,
    pub(crate) frame: i32,
    pub(crate) diagnostics: Option<&'a DiagnosticCounters>,
}

impl<'a, M: ScoreMatrix> ChainAligner<'a, M> {
    pub fn new(
        query: &'a [Letter],
        target: &'a [Letter],
        matrix: &'a M,
        config: &'a ChainingConfig,
    ) -> Self {
        Self {
            query,
            target,
            matrix,
            config,
            frame: 0,
            diagnostics: None,
        }
    }

    pub fn with_frame(mut self, frame: i32) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Option<&'a DiagnosticCounters>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Chain `segments` into scored candidate alignments.
    ///
    /// With `with_transcripts`, every chain also gets a chain-level [`Hsp`]
    /// whose transcript joins the segments with single gap runs.
    pub fn run(
        &self,
        segments: &[DiagonalSegment],
        scratch: &mut ChainScratch,
        with_transcripts: bool,
    ) -> Result<ChainOutput> {
        for (index, seg) in segments.iter().enumerate() {
            if !seg.lies_within(self.query, self.target) {
                return Err(AlignError::SegmentOutOfBounds { index });
            }
        }
        if let Some(diag) = self.diagnostics {
            bump(&diag.seed_segments, segments.len());
        }

        scratch.clear();
        if segments.len() == 1 {
            return Ok(self.single_segment(&segments[0], with_transcripts));
        }

        scratch.graph.load(segments);
        if scratch.graph.is_empty() {
            return Ok(ChainOutput::default());
        }
        let loaded = scratch.graph.len();
        let capped = self.apply_caps(&mut scratch.graph);
        scratch.graph.sort();
        let pruned = scratch.graph.prune(self.config.range_cover);
        debug!(
            "frame {}: {} segments, {} nodes loaded, {} capped, {} pruned",
            self.frame,
            segments.len(),
            loaded,
            capped,
            pruned
        );

        self.forward_pass(scratch)?;
        let out = self.backtrace(&scratch.graph, with_transcripts);
        debug!(
            "frame {}: {} edges, {} chains, max score {}",
            self.frame,
            scratch.graph.edges.len(),
            out.chains.len(),
            out.max_score
        );

        if let Some(diag) = self.diagnostics {
            bump(&diag.nodes_loaded, loaded);
            bump(&diag.nodes_capped, capped);
            bump(&diag.nodes_pruned, pruned);
            bump(&diag.edges_created, scratch.graph.edges.len());
            bump(&diag.chains_emitted, out.chains.len());
        }
        Ok(out)
    }

    fn single_segment(&self, seg: &DiagonalSegment, with_transcript: bool) -> ChainOutput {
        if seg.len <= 0 {
            return ChainOutput::default();
        }
        let mut out = ChainOutput {
            max_score: seg.score,
            chains: vec![ApproxHsp::from_segment(seg, self.frame)],
            hsps: Vec::new(),
        };
        if with_transcript {
            let mut hsp =
                Hsp::new(seg.score, seg.query_range(), seg.target_range()).with_frame(self.frame);
            self.push_diagonal(&mut hsp, seg.diag(), seg.target_start, seg.target_end());
            hsp.transcript.finish();
            hsp.compute_stats(self.query, self.matrix);
            out.hsps.push(hsp);
        }
        if let Some(diag) = self.diagnostics {
            bump(&diag.chains_emitted, 1);
        }
        out
    }

    /// Drop low-scoring nodes beyond the node-count cap and the
    /// query-length-proportional cap. Returns the number of nodes dropped.
    fn apply_caps(&self, graph: &mut DiagGraph) -> usize {
        let before = graph.len();
        let c = self.config;
        if c.max_nodes > 0 && graph.len() > c.max_nodes {
            graph
                .nodes
                .sort_by(|a, b| b.seg.score.cmp(&a.seg.score));
            graph.nodes.truncate(c.max_nodes);
        }
        if c.len_cap > 0.0 && graph.len() > c.min_nodes {
            graph
                .nodes
                .sort_by(|a, b| b.seg.score.cmp(&a.seg.score));
            let cap = self.query.len() as f64 * c.len_cap;
            let mut total_len = 0.0;
            let mut keep = 0;
            while keep < graph.len() && total_len < cap {
                total_len += graph.nodes[keep].seg.len as f64;
                keep += 1;
            }
            graph.nodes.truncate(keep.max(c.min_nodes));
        }
        before - graph.len()
    }

    #[inline]
    fn space_cost(&self, distance: Loc) -> Score {
        (self.config.space_penalty * distance.max(0) as f64) as Score
    }

    /// Try to extend the best path into `e_idx` by node `d_idx`. Records an
    /// edge if the result beats both `d`'s own score and its best edge at the
    /// same entry point. Returns the resulting prefix score (0 if rejected
    /// early).
    pub(crate) fn approximate_link(
        &self,
        graph: &mut DiagGraph,
        d_idx: usize,
        e_idx: usize,
    ) -> Result<Score> {
        let d = graph.nodes[d_idx];
        let e = graph.nodes[e_idx];
        let shift = d.seg.diag() - e.seg.diag();
        let gap_score = if shift != 0 {
            -self.matrix.gap_open() - shift.abs() * self.matrix.gap_extend()
        } else {
            0
        };
        let space = if shift > 0 {
            d.seg.target_start - e.seg.target_last()
        } else {
            d.seg.query_start - e.seg.query_last()
        };

        let prefix_score;
        let prefix_score_begin;
        let mut path_max;
        let mut path_min;
        let cutoff;
        if space <= 0 {
            if let Some(k) = graph.get_edge(d_idx, d.seg.target_start) {
                if graph.edges[k].prefix_score > e.prefix_score + gap_score + d.seg.score {
                    return Ok(0);
                }
            }
            let link = match get_link(
                &e.seg,
                &d.seg,
                self.query,
                self.target,
                self.config.link_padding,
                self.matrix,
            ) {
                Some(link) => link,
                None => return Ok(0),
            };
            let diff1 = e.seg.score - link.score1;
            let (prefix_e, e_max, e_min) = graph.prefix_score(e_idx, link.target_pos1);
            prefix_score = prefix_e - diff1 + gap_score + link.score2;
            if let Some(k) = graph.get_edge(d_idx, link.target_pos2) {
                if graph.edges[k].prefix_score > prefix_score {
                    return Ok(0);
                }
            }
            prefix_score_begin = prefix_score - link.score2;
            path_min = e_min.min(prefix_score - link.score2);
            path_max = if prefix_e == e_max { e_max - diff1 } else { e_max };
            cutoff = link.target_pos2;
        } else {
            prefix_score = e.prefix_score + gap_score - self.space_cost(space - 1) + d.seg.score;
            if let Some(k) = graph.get_edge(d_idx, d.seg.target_start) {
                if graph.edges[k].prefix_score > prefix_score {
                    return Ok(0);
                }
            }
            prefix_score_begin = prefix_score - d.seg.score;
            path_max = e.path_max;
            path_min = e.path_min.min(prefix_score - d.seg.score);
            cutoff = d.seg.target_start;
        }

        if prefix_score > d.seg.score {
            path_max = path_max.max(prefix_score);
            graph.add_edge(Edge {
                prefix_score,
                path_max,
                path_min: if prefix_score == path_max {
                    prefix_score
                } else {
                    path_min
                },
                prefix_score_begin,
                cutoff,
                node_in: d_idx as u32,
                node_out: e_idx as u32,
            })?;
            trace!(
                "link {} -> {} shift={} space={} prefix_score={} path_min={}",
                e_idx,
                d_idx,
                shift,
                space,
                prefix_score,
                path_min
            );
        }
        Ok(prefix_score)
    }

    /// Sweep the target-sorted nodes, linking each to the window entries on
    /// the diagonals below and above it.
    pub(crate) fn forward_pass(&self, scratch: &mut ChainScratch) -> Result<()> {
        let ChainScratch {
            graph,
            window,
            window_keys,
        } = scratch;
        window.clear();
        let overhang = self.config.reverse_link_min_overhang;

        for node in 0..graph.len() {
            graph.init_node(node)?;
            let d = graph.nodes[node].seg;
            let dd = d.diag();
            window.entry(dd).or_insert(node as u32);

            // lower diagonals, nearest first
            window_keys.clear();
            window_keys.extend(window.range(..dd).rev().map(|(&k, &v)| (k, v)));
            let mut max_j = 0;
            for &(de, e_idx) in window_keys.iter() {
                let e_idx = e_idx as usize;
                let e = graph.nodes[e_idx];
                if e.prefix_score - self.space_cost(d.target_start - e.seg.target_end()) <= 0 {
                    window.remove(&de);
                    continue;
                }
                if e.seg.target_end() < max_j {
                    continue;
                }
                self.approximate_link(graph, node, e_idx)?;
                max_j = max_j.max(d.target_start.min(e.seg.target_end()));
                if e.seg.target_end() - (d.target_end() - (e.seg.diag() - dd).min(0)) >= overhang {
                    trace!("reverse link node={}", e_idx);
                    self.approximate_link(graph, e_idx, node)?;
                }
            }

            // own diagonal and above
            window_keys.clear();
            window_keys.extend(window.range(dd..).map(|(&k, &v)| (k, v)));
            let mut max_i = 0;
            for &(de, e_idx) in window_keys.iter() {
                let e_idx = e_idx as usize;
                let own_diag = de == dd;
                if own_diag && e_idx == node {
                    continue;
                }
                let e = graph.nodes[e_idx];
                if !own_diag
                    && e.prefix_score - self.space_cost(d.target_start - e.seg.target_end()) <= 0
                {
                    window.remove(&de);
                    continue;
                }
                if e.seg.query_end() < max_i {
                    continue;
                }
                self.approximate_link(graph, node, e_idx)?;
                if e.seg.query_start < d.query_start {
                    max_i = max_i.max(e.seg.query_end().min(d.query_start));
                }
                if e.seg.target_end() - (d.target_end() - (e.seg.diag() - dd).min(0)) >= overhang {
                    trace!("reverse link node={}", e_idx);
                    self.approximate_link(graph, e_idx, node)?;
                }
            }

            window.insert(dd, node as u32);
            let n = &graph.nodes[node];
            trace!(
                "node {} prefix_score={} path_max={} path_min={}",
                node,
                n.prefix_score,
                n.path_max,
                n.path_min
            );
        }
        Ok(())
    }

    /// Append the columns of diagonal `diag` for target positions
    /// `j..j_end` to the transcript of `hsp`.
    pub(crate) fn push_diagonal(&self, hsp: &mut Hsp, diag: Loc, j: Loc, j_end: Loc) {
        use crate::align::transcript::EditOp;
        for j in j..j_end {
            let t = self.target[j as usize];
            let q = self.query[(diag + j) as usize];
            if q == t {
                hsp.transcript.push(EditOp::Match);
            } else {
                hsp.transcript.push_letter(EditOp::Substitution, t);
            }
        }
    }
}
