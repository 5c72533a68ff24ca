//! Ungapped local match on a single diagonal.

use std::cmp::Ordering;

use crate::common::{is_sequence_end, Interval, Letter, Loc, Score};
use crate::utils::matrix::ScoreMatrix;

/// Ungapped match `query[i..i+len]` vs `target[j..j+len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DiagonalSegment {
    pub query_start: Loc,
    pub target_start: Loc,
    pub len: Loc,
    pub score: Score,
}

impl DiagonalSegment {
    #[inline]
    pub fn new(query_start: Loc, target_start: Loc, len: Loc, score: Score) -> Self {
        debug_assert!(len >= 0);
        Self {
            query_start,
            target_start,
            len,
            score,
        }
    }

    /// Build a segment and score it against the sequences.
    pub fn scored<M: ScoreMatrix>(
        query: &[Letter],
        target: &[Letter],
        query_start: Loc,
        target_start: Loc,
        len: Loc,
        matrix: &M,
    ) -> Self {
        let score = score_range(
            query,
            target,
            query_start,
            target_start,
            target_start + len,
            matrix,
        );
        Self::new(query_start, target_start, len, score)
    }

    #[inline]
    pub fn diag(&self) -> Loc {
        self.query_start - self.target_start
    }

    #[inline]
    pub fn query_end(&self) -> Loc {
        self.query_start + self.len
    }

    #[inline]
    pub fn target_end(&self) -> Loc {
        self.target_start + self.len
    }

    #[inline]
    pub fn query_last(&self) -> Loc {
        self.query_end() - 1
    }

    #[inline]
    pub fn target_last(&self) -> Loc {
        self.target_end() - 1
    }

    #[inline]
    pub fn query_range(&self) -> Interval {
        Interval::new(self.query_start, self.query_end())
    }

    #[inline]
    pub fn target_range(&self) -> Interval {
        Interval::new(self.target_start, self.target_end())
    }

    /// Swap the roles of query and target.
    #[inline]
    pub fn transpose(&self) -> Self {
        Self::new(self.target_start, self.query_start, self.len, self.score)
    }

    /// Fits inside sequences of the given lengths.
    #[inline]
    pub fn fits(&self, query_len: usize, target_len: usize) -> bool {
        let end = |start: Loc| start as i64 + self.len as i64;
        self.len >= 0
            && self.query_start >= 0
            && self.target_start >= 0
            && end(self.query_start) <= query_len as i64
            && end(self.target_start) <= target_len as i64
    }

    /// Fits inside `query` and `target` and crosses no sequence end on
    /// either of them.
    pub fn lies_within(&self, query: &[Letter], target: &[Letter]) -> bool {
        if !self.fits(query.len(), target.len()) {
            return false;
        }
        let q = self.query_start as usize..self.query_end() as usize;
        let t = self.target_start as usize..self.target_end() as usize;
        !query[q].iter().chain(&target[t]).any(|&l| is_sequence_end(l))
    }

    /// Target, then query order.
    #[inline]
    pub fn cmp_target(&self, other: &Self) -> Ordering {
        self.target_start
            .cmp(&other.target_start)
            .then(self.query_start.cmp(&other.query_start))
    }

    /// Diagonal, then target order. This is the order [`load`] expects.
    ///
    /// [`load`]: crate::chaining::graph::DiagGraph::load
    #[inline]
    pub fn cmp_diag(&self, other: &Self) -> Ordering {
        self.diag()
            .cmp(&other.diag())
            .then(self.target_start.cmp(&other.target_start))
    }
}

/// Sum of substitution scores along the diagonal through `(i, j)` for target
/// positions `j..j_end`. Empty when `j >= j_end`.
#[inline]
pub fn score_range<M: ScoreMatrix>(
    query: &[Letter],
    target: &[Letter],
    i: Loc,
    j: Loc,
    j_end: Loc,
    matrix: &M,
) -> Score {
    let mut score = 0;
    let (mut i, mut j) = (i, j);
    while j < j_end {
        score += matrix.score(query[i as usize], target[j as usize]);
        i += 1;
        j += 1;
    }
    score
}
