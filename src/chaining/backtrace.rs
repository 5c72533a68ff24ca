//! Reading chains off the linked diagonal graph.

use log::trace;

use crate::align::result::Hsp;
use crate::align::transcript::EditOp;
use crate::chaining::aligner::{ChainAligner, ChainOutput};
use crate::chaining::approx::ApproxHsp;
use crate::chaining::graph::{DiagGraph, Edge};
use crate::common::{Interval, Loc, Score};
use crate::utils::matrix::ScoreMatrix;

/// Pending node on the backtrace path.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: usize,
    j_end: Loc,
    score_min: Score,
    prefix_score: Score,
    edge: Option<Edge>,
    /// The path continues into `edge.node_out`
    descended: bool,
}

/// True unless `score` is mostly covered by an already accepted chain of
/// comparable score.
pub(crate) fn is_disjoint(
    accepted: &[ApproxHsp],
    query_range: &Interval,
    target_range: &Interval,
    score: Score,
    cutoff: Score,
    stacked_ratio: f64,
) -> bool {
    for other in accepted {
        if other.score <= 0 {
            continue;
        }
        let ot = target_range.overlap_factor(&other.target_range);
        let oq = query_range.overlap_factor(&other.query_range);
        if (1.0 - ot.min(oq)) * score as f64 / other.score as f64 >= stacked_ratio {
            continue;
        }
        if (1.0 - ot.max(oq)) * (score as f64) < cutoff as f64 {
            return false;
        }
    }
    true
}

impl<'a, M: ScoreMatrix> ChainAligner<'a, M> {
    /// Emit chains from every qualifying chain end, best first.
    pub(crate) fn backtrace(&self, graph: &DiagGraph, with_transcripts: bool) -> ChainOutput {
        let cutoff = self.config.min_chain_score;
        let mut tops: Vec<(usize, Score)> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(k, n)| (k, n.rel_score()))
            .filter(|&(_, s)| s >= cutoff)
            .collect();
        tops.sort_by(|a, b| b.1.cmp(&a.1));

        let mut out = ChainOutput::default();
        for (node, rel_score) in tops {
            let seg = graph.nodes[node].seg;
            if !is_disjoint(
                &out.chains,
                &seg.query_range(),
                &seg.target_range(),
                seg.score,
                cutoff,
                self.config.stacked_hsp_ratio,
            ) {
                continue;
            }
            trace!("chain top node={} rel_score={}", node, rel_score);
            self.backtrace_from(graph, node, with_transcripts, &mut out);
        }
        out
    }

    /// Follow chains starting at `top`. A chain broken by a diagonal shift
    /// beyond `max_shift` continues as a separate chain from the node on the
    /// other side of the shift.
    fn backtrace_from(
        &self,
        graph: &DiagGraph,
        top: usize,
        with_transcripts: bool,
        out: &mut ChainOutput,
    ) {
        let cutoff = self.config.min_chain_score;
        let mut max_j = self.target.len() as Loc;
        let mut top = Some(top);
        let mut rounds = 0;
        while let Some(node) = top {
            if rounds > graph.len() {
                break;
            }
            rounds += 1;

            let mut next = None;
            let mut hsp = with_transcripts.then(Hsp::default);
            let t = self.backtrace_chain(graph, node, max_j, &mut next, hsp.as_mut());
            if t.score > 0 {
                max_j = t.target_range.begin;
            }
            if t.score >= cutoff
                && is_disjoint(
                    &out.chains,
                    &t.query_range,
                    &t.target_range,
                    t.score,
                    cutoff,
                    self.config.stacked_hsp_ratio,
                )
            {
                out.max_score = out.max_score.max(t.score);
                out.chains.push(t);
                if let Some(hsp) = hsp {
                    out.hsps.push(hsp);
                }
            }
            top = next;
        }
    }

    /// Walk back from `top` along the best edges, stopping where the path
    /// reaches its lowest prefix score.
    fn backtrace_chain(
        &self,
        graph: &DiagGraph,
        top: usize,
        max_j: Loc,
        next: &mut Option<usize>,
        mut hsp: Option<&mut Hsp>,
    ) -> ApproxHsp {
        let mut t = ApproxHsp::new(self.frame);
        let d = graph.nodes[top];
        let top_j_end = d.seg.target_end().min(max_j);
        let score_max = d.prefix_score;
        t.query_range.end = top_j_end + d.seg.diag();
        t.target_range.end = top_j_end;

        let mut frames: Vec<Frame> = Vec::new();
        let mut node = top;
        let mut j_end = top_j_end;
        let mut score_min = score_max;
        let mut child_ok = loop {
            let n = &graph.nodes[node];
            let edge = graph.get_edge(node, j_end).map(|k| graph.edges[k]);
            let prefix_score = edge.map_or(n.seg.score, |e| e.prefix_score);
            if prefix_score > score_max {
                break Some(false);
            }
            score_min = score_min.min(edge.map_or(0, |e| e.prefix_score_begin));
            let mut frame = Frame {
                node,
                j_end,
                score_min,
                prefix_score,
                edge,
                descended: false,
            };
            if let Some(e) = edge {
                let out = e.node_out as usize;
                let shift = n.seg.diag() - graph.nodes[out].seg.diag();
                if shift.abs() <= self.config.max_shift {
                    frame.descended = true;
                    frames.push(frame);
                    node = out;
                    j_end = if shift > 0 { e.cutoff } else { e.cutoff + shift };
                    continue;
                }
                *next = Some(out);
            }
            frames.push(frame);
            break None;
        };

        while let Some(frame) = frames.pop() {
            let at_end = if frame.descended {
                if child_ok == Some(true) {
                    false
                } else {
                    let begin = frame.edge.map_or(0, |e| e.prefix_score_begin);
                    if begin > frame.score_min {
                        child_ok = Some(false);
                        continue;
                    }
                    true
                }
            } else {
                true
            };

            let seg = graph.nodes[frame.node].seg;
            let j = if at_end {
                t.query_range.begin = seg.query_start;
                t.target_range.begin = seg.target_start;
                t.score = score_max - frame.score_min;
                seg.target_start
            } else {
                let e = match frame.edge {
                    Some(e) => e,
                    None => continue,
                };
                let shift = seg.diag() - graph.nodes[e.node_out as usize].seg.diag();
                if let Some(h) = hsp.as_deref_mut() {
                    if shift > 0 {
                        h.transcript.push_run(EditOp::Insertion, shift as u32);
                    } else if shift < 0 {
                        for p in e.cutoff + shift..e.cutoff {
                            h.transcript
                                .push_letter(EditOp::Deletion, self.target[p as usize]);
                        }
                    }
                }
                e.cutoff
            };
            t.visit(&seg, frame.prefix_score);
            if let Some(h) = hsp.as_deref_mut() {
                self.push_diagonal(h, seg.diag(), j, frame.j_end);
            }
            child_ok = Some(true);
        }

        if let Some(h) = hsp {
            h.score = t.score;
            h.frame = self.frame;
            h.query_range = t.query_range;
            h.target_range = t.target_range;
            h.transcript.finish();
            h.compute_stats(self.query, self.matrix);
        }
        t
    }
}
