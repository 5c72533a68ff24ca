//! Exact junction search between two segments on different diagonals.
//!
//! For a pair of segments where `d1` precedes `d2`, every splice point in a
//! small window around their geometric junction is tried: `d1` is truncated
//! (or extended) to end at `(query_pos1, target_pos1)` and `d2` starts at
//! `(query_pos2, target_pos2)`, with the diagonal shift bridged by a single
//! gap in between. The splice with the best combined substitution score wins.

use crate::chaining::segment::DiagonalSegment;
use crate::common::{Letter, Loc, Score};
use crate::utils::matrix::ScoreMatrix;

/// Chosen splice between two segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Link {
    pub query_pos1: Loc,
    pub target_pos1: Loc,
    pub query_pos2: Loc,
    pub target_pos2: Loc,
    /// Score of the first segment up to and including the splice.
    pub score1: Score,
    /// Score of the second segment from the splice on.
    pub score2: Score,
}

impl Link {
    fn transpose(self) -> Self {
        Self {
            query_pos1: self.target_pos1,
            target_pos1: self.query_pos1,
            query_pos2: self.target_pos2,
            target_pos2: self.query_pos2,
            ..self
        }
    }
}

/// Diagonal run sum over `first[i..]` vs `second[j..j_end]`.
#[inline]
fn run_score<F>(score: &F, i: Loc, j: Loc, j_end: Loc) -> Score
where
    F: Fn(Loc, Loc) -> Score,
{
    let mut s = 0;
    let (mut i, mut j) = (i, j);
    while j < j_end {
        s += score(i, j);
        i += 1;
        j += 1;
    }
    s
}

/// Junction search for `d1.diag() >= d2.diag()`: the gap consumes letters of
/// the second sequence. `score(i, j)` scores position `i` of the first
/// sequence against position `j` of the second.
fn hgap_link<F>(
    d1: &DiagonalSegment,
    d2: &DiagonalSegment,
    padding: Loc,
    score: &F,
) -> Option<(Score, Link)>
where
    F: Fn(Loc, Loc) -> Score,
{
    let d = d1.diag() - d2.diag();
    let j2_end = d2
        .target_start
        .max(d1.target_last() + d + 1 + padding)
        .min(d2.target_last());

    let (mut j1, space) = if d1.target_last() < d2.target_start - d - 1 {
        (d1.target_last(), true)
    } else {
        ((d2.target_start - d - 1 - padding).max(d1.target_start), false)
    };
    let mut j2 = j1 + d + 1;
    let mut i1 = d1.query_start + (j1 - d1.target_start);
    let mut i2 = i1 + 1;
    if j2 > d2.target_last() {
        return None;
    }

    let mut score1 = 0;
    let mut score2 = run_score(score, i2, j2, d2.target_start) + d2.score
        - run_score(score, d2.query_start, d2.target_start, j2);
    let mut best: Option<(Score, Link)> = None;
    loop {
        let total = score1 + score2;
        if best.map_or(true, |(s, _)| total > s) {
            best = Some((
                total,
                Link {
                    query_pos1: i1,
                    target_pos1: j1,
                    query_pos2: i2,
                    target_pos2: j2,
                    score1,
                    score2,
                },
            ));
        }
        score2 -= score(i2, j2);
        i1 += 1;
        i2 += 1;
        j1 += 1;
        j2 += 1;
        if j2 > j2_end {
            break;
        }
        score1 += score(i1, j1);
    }

    let (max, mut link) = best?;
    let j1_end = j2_end - d;
    link.score1 = if space {
        d1.score + link.score1
    } else {
        d1.score - run_score(score, d1.diag() + j1_end, j1_end, d1.target_end())
            + run_score(score, d1.query_end(), d1.target_end(), j1_end)
            - score1
            + link.score1
    };
    Some((max, link))
}

/// Best splice between `d1` and a later segment `d2`. `None` when no splice
/// point fits inside `d2` or the best splice does not score positively.
pub fn get_link<M: ScoreMatrix>(
    d1: &DiagonalSegment,
    d2: &DiagonalSegment,
    query: &[Letter],
    target: &[Letter],
    padding: Loc,
    matrix: &M,
) -> Option<Link> {
    let found = if d1.diag() < d2.diag() {
        let score = |i: Loc, j: Loc| matrix.score(query[j as usize], target[i as usize]);
        hgap_link(&d1.transpose(), &d2.transpose(), padding, &score)
            .map(|(s, l)| (s, l.transpose()))
    } else {
        let score = |i: Loc, j: Loc| matrix.score(query[i as usize], target[j as usize]);
        hgap_link(d1, d2, padding, &score)
    };
    found.filter(|&(s, _)| s > 0).map(|(_, link)| link)
}
