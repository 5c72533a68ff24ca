use log::debug;
use rustc_hash::FxHashMap;

use crate::chaining::approx::ApproxHsp;
use crate::common::Score;
use crate::utils::matrix::ScoreMatrix;

/// Cost of bridging the gap from `a` to `b`, or `None` if `b` does not
/// start after `a` ends on both sequences.
fn bridge_penalty<M: ScoreMatrix>(
    a: &ApproxHsp,
    b: &ApproxHsp,
    matrix: &M,
    space_penalty: f64,
) -> Option<Score> {
    let gap_q = b.query_range.begin - a.query_range.end;
    let gap_t = b.target_range.begin - a.target_range.end;
    if gap_q < 0 || gap_t < 0 {
        return None;
    }
    let larger = gap_q.max(gap_t);
    let smaller = gap_q.min(gap_t);
    Some(matrix.gap_extend() * larger + (space_penalty * smaller as f64) as Score)
}

/// Join `a` and `b` (in this order) if the joined chain outscores both.
fn try_merge<M: ScoreMatrix>(
    a: &ApproxHsp,
    b: &ApproxHsp,
    matrix: &M,
    space_penalty: f64,
) -> Option<ApproxHsp> {
    let penalty = bridge_penalty(a, b, matrix, space_penalty)?;
    let score = a.score + b.score - penalty;
    if score <= a.score.max(b.score) {
        return None;
    }
    let max_diag = if b.max_diag.seg.score > a.max_diag.seg.score {
        b.max_diag
    } else {
        a.max_diag
    };
    Some(ApproxHsp {
        d_min: a.d_min.min(b.d_min),
        d_max: a.d_max.max(b.d_max),
        score,
        frame: a.frame,
        query_range: a.query_range.hull(&b.query_range),
        target_range: a.target_range.hull(&b.target_range),
        max_diag,
    })
}

/// Merge chains of one frame until no pair improves by merging.
fn merge_frame<M: ScoreMatrix>(
    mut chains: Vec<ApproxHsp>,
    matrix: &M,
    space_penalty: f64,
) -> (Vec<ApproxHsp>, usize) {
    let mut merges = 0;
    loop {
        chains.sort_by(|x, y| {
            x.target_range
                .begin
                .cmp(&y.target_range.begin)
                .then(x.query_range.begin.cmp(&y.query_range.begin))
        });
        let mut found = None;
        'search: for i in 0..chains.len() {
            for j in i + 1..chains.len() {
                if let Some(m) = try_merge(&chains[i], &chains[j], matrix, space_penalty) {
                    found = Some((i, j, m));
                    break 'search;
                }
            }
        }
        match found {
            Some((i, j, merged)) => {
                debug!(
                    "merged chains q{}-{} and q{}-{} (frame {}) into score {}",
                    chains[i].query_range.begin,
                    chains[i].query_range.end,
                    chains[j].query_range.begin,
                    chains[j].query_range.end,
                    merged.frame,
                    merged.score
                );
                chains[i] = merged;
                chains.remove(j);
                merges += 1;
            }
            None => return (chains, merges),
        }
    }
}

/// Merge collinear chains of the same frame whose combined score, after the
/// gap between them is charged, beats each of them alone.
///
/// The bridge between `a` and a following `b` costs `gap_extend` per letter
/// of the larger of the two gaps plus `space_penalty` per letter of the
/// smaller one. Returns the chains, best first, and the number of merges.
pub fn merge_chains<M: ScoreMatrix>(
    chains: Vec<ApproxHsp>,
    matrix: &M,
    space_penalty: f64,
) -> (Vec<ApproxHsp>, usize) {
    if chains.len() < 2 {
        return (chains, 0);
    }
    let mut by_frame: FxHashMap<i32, Vec<ApproxHsp>> = FxHashMap::default();
    for chain in chains {
        by_frame.entry(chain.frame).or_default().push(chain);
    }

    let mut result = Vec::new();
    let mut merges = 0;
    for (_frame, group) in by_frame {
        let (merged, n) = merge_frame(group, matrix, space_penalty);
        merges += n;
        result.extend(merged);
    }
    result.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.frame.cmp(&b.frame))
            .then(a.target_range.begin.cmp(&b.target_range.begin))
            .then(a.query_range.begin.cmp(&b.query_range.begin))
    });
    (result, merges)
}
