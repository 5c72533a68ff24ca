//! Chain-level (approximate) alignment records.

use crate::chaining::segment::DiagonalSegment;
use crate::common::{Interval, Loc, Score};

/// Highest-scoring segment of a chain, with the diagonal spread of the chain
/// on either side of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub seg: DiagonalSegment,
    /// Prefix score of the chain at this segment
    pub prefix_score: Score,
    pub d_min_left: Loc,
    pub d_max_left: Loc,
    pub d_min_right: Loc,
    pub d_max_right: Loc,
}

impl Default for Anchor {
    fn default() -> Self {
        Self::from(DiagonalSegment::default())
    }
}

impl From<DiagonalSegment> for Anchor {
    fn from(seg: DiagonalSegment) -> Self {
        Self {
            seg,
            prefix_score: 0,
            d_min_left: Loc::MAX,
            d_max_left: Loc::MIN,
            d_min_right: Loc::MAX,
            d_max_right: Loc::MIN,
        }
    }
}

impl Anchor {
    /// Furthest diagonal distance of the chain from this anchor.
    pub fn diag_spread(&self) -> Loc {
        let d = self.seg.diag();
        [
            self.d_min_left,
            self.d_max_left,
            self.d_min_right,
            self.d_max_right,
        ]
        .iter()
        .filter(|&&x| x != Loc::MAX && x != Loc::MIN)
        .map(|&x| (x - d).abs())
        .max()
        .unwrap_or(0)
    }
}

/// Candidate alignment produced by chaining, before exact refinement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApproxHsp {
    pub d_min: Loc,
    pub d_max: Loc,
    pub score: Score,
    pub frame: i32,
    pub query_range: Interval,
    pub target_range: Interval,
    /// Representative diagonal of the chain
    pub max_diag: Anchor,
}

impl ApproxHsp {
    pub fn new(frame: i32) -> Self {
        Self {
            d_min: Loc::MAX,
            d_max: Loc::MIN,
            score: 0,
            frame,
            query_range: Interval::default(),
            target_range: Interval::default(),
            max_diag: Anchor::default(),
        }
    }

    /// Chain made of the single segment `seg`.
    pub fn from_segment(seg: &DiagonalSegment, frame: i32) -> Self {
        let d = seg.diag();
        Self {
            d_min: d,
            d_max: d,
            score: seg.score,
            frame,
            query_range: seg.query_range(),
            target_range: seg.target_range(),
            max_diag: Anchor {
                seg: *seg,
                prefix_score: seg.score,
                d_min_left: d,
                d_max_left: d,
                d_min_right: d,
                d_max_right: d,
            },
        }
    }

    /// Record a chain segment visited during backtrace, chain start first.
    pub(crate) fn visit(&mut self, seg: &DiagonalSegment, prefix_score: Score) {
        let dd = seg.diag();
        self.d_max = self.d_max.max(dd);
        self.d_min = self.d_min.min(dd);
        let a = &mut self.max_diag;
        if seg.score > a.seg.score {
            a.seg = *seg;
            a.prefix_score = prefix_score;
            a.d_max_left = a.d_max_right.max(a.d_max_left).max(dd);
            a.d_min_left = a.d_min_right.min(a.d_min_left).min(dd);
            a.d_max_right = dd;
            a.d_min_right = dd;
        } else {
            a.d_max_right = a.d_max_right.max(dd);
            a.d_min_right = a.d_min_right.min(dd);
        }
    }
}
