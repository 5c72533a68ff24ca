//! Banded X-drop extension around an anchor diagonal.
//!
//! The anchor segment is scored as is; the DP extends outward from both of
//! its ends inside a fixed band of diagonals. Each direction stops at a
//! sequence end or delimiter, or once the best column score falls more than
//! `x_drop` below the best score seen.

use log::{debug, trace};

use crate::align::dp_matrix::{DpBackend, ScoreOnlyBuffer, TracebackBuffer};
use crate::align::result::Hsp;
use crate::align::transcript::EditOp;
use crate::chaining::segment::DiagonalSegment;
use crate::common::{is_sequence_end, Interval, Letter, Loc, Score, NEG_INF};
use crate::config::{ExtensionConfig, ExtensionMode};
use crate::diagnostics::{bump, DiagnosticCounters};
use crate::error::{AlignError, Result};
use crate::utils::matrix::ScoreMatrix;

/// Per-position score correction added to every substitution score.
pub trait BiasCorrection: Sync {
    fn correction(&self, query_pos: usize) -> Score;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCorrection;

impl BiasCorrection for NoCorrection {
    #[inline]
    fn correction(&self, _query_pos: usize) -> Score {
        0
    }
}

/// Additive correction per query position. Positions past the table get 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBiasCorrection {
    values: Vec<Score>,
}

impl QueryBiasCorrection {
    pub fn new(values: Vec<Score>) -> Self {
        Self { values }
    }
}

impl BiasCorrection for QueryBiasCorrection {
    #[inline]
    fn correction(&self, query_pos: usize) -> Score {
        self.values.get(query_pos).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Sequence read outward from an origin: forward from `origin` or backward
/// from `origin - 1`, up to the sequence end or the first letter that ends a
/// sequence.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DirSeq<'a> {
    seq: &'a [Letter],
    origin: usize,
    dir: Direction,
    len: usize,
}

impl<'a> DirSeq<'a> {
    pub(crate) fn new(seq: &'a [Letter], origin: usize, dir: Direction) -> Self {
        let origin = origin.min(seq.len());
        let len = match dir {
            Direction::Right => seq[origin..]
                .iter()
                .take_while(|&&l| !is_sequence_end(l))
                .count(),
            Direction::Left => seq[..origin]
                .iter()
                .rev()
                .take_while(|&&l| !is_sequence_end(l))
                .count(),
        };
        Self {
            seq,
            origin,
            dir,
            len,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Absolute position of offset `k`.
    #[inline]
    pub(crate) fn pos(&self, k: usize) -> usize {
        match self.dir {
            Direction::Right => self.origin + k,
            Direction::Left => self.origin - 1 - k,
        }
    }

    #[inline]
    pub(crate) fn get(&self, k: usize) -> Letter {
        self.seq[self.pos(k)]
    }
}

/// Best cell of one extension direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extension {
    pub score: Score,
    /// Query letters covered
    pub query_len: Loc,
    /// Target letters covered
    pub target_len: Loc,
    /// DP cells computed
    pub cells: usize,
}

/// One direction of the banded DP.
pub(crate) struct BandedScan<'a, M: ScoreMatrix, C: BiasCorrection> {
    pub(crate) query: DirSeq<'a>,
    pub(crate) target: DirSeq<'a>,
    pub(crate) matrix: &'a M,
    pub(crate) bias: &'a C,
    pub(crate) band: usize,
    pub(crate) x_drop: Score,
}

impl<'a, M: ScoreMatrix, C: BiasCorrection> BandedScan<'a, M, C> {
    #[inline]
    pub(crate) fn match_score(&self, r: usize, c: usize) -> Score {
        self.matrix.score(self.query.get(r), self.target.get(c))
            + self.bias.correction(self.query.pos(r))
    }

    /// Score of the boundary cell on query offset -1 at target offset `c`.
    #[inline]
    pub(crate) fn leading_deletion(&self, c: usize) -> Score {
        -(self.matrix.gap_open() + (c as Score + 1) * self.matrix.gap_extend())
    }

    /// Fill the band column by column (one column per target letter) and
    /// return the best cell.
    pub(crate) fn fill<B: DpBackend>(&self, buf: &mut B, hgap: &mut Vec<Score>) -> Extension {
        let mut ext = Extension::default();
        let qlen = self.query.len();
        let tlen = self.target.len();
        if qlen == 0 || tlen == 0 {
            return ext;
        }
        let band = self.band;
        let rows = 2 * band + 1;
        let gap_extend = self.matrix.gap_extend();
        let gap_open = self.matrix.gap_open() + gap_extend;

        buf.reset(rows, self.matrix.gap_open(), gap_extend);
        hgap.clear();
        hgap.resize(rows + 1, NEG_INF);

        let mut best = 0;
        for c in 0..tlen {
            let r_lo = c.saturating_sub(band);
            let r_hi = (c + band + 1).min(qlen);
            if r_lo >= r_hi {
                break;
            }
            let b_lo = r_lo + band - c;
            let b_hi = r_hi + band - c;
            let (prev, cur) = buf.column_pair(c);
            cur.fill(NEG_INF);
            if c < band {
                cur[band - c - 1] = self.leading_deletion(c);
            }

            let mut vgap = NEG_INF;
            let mut column_max = NEG_INF;
            for (r, b) in (r_lo..r_hi).zip(b_lo..b_hi) {
                let hgap_in = hgap[b + 1];
                let s = (prev[b] + self.match_score(r, c)).max(vgap).max(hgap_in);
                cur[b] = s;
                let open = s - gap_open;
                vgap = (vgap - gap_extend).max(open);
                hgap[b] = (hgap_in - gap_extend).max(open);
                column_max = column_max.max(s);
                if s > best {
                    best = s;
                    ext.query_len = r as Loc + 1;
                    ext.target_len = c as Loc + 1;
                }
            }
            for slot in hgap[..b_lo].iter_mut() {
                *slot = NEG_INF;
            }
            for slot in hgap[b_hi..].iter_mut() {
                *slot = NEG_INF;
            }
            ext.cells += r_hi - r_lo;

            if best - column_max > self.x_drop {
                trace!("x-drop at column {} (best {}, column {})", c, best, column_max);
                break;
            }
        }
        ext.score = best;
        ext
    }
}

/// Reusable DP buffers. One per worker thread.
#[derive(Debug, Default, Clone)]
pub struct ExtensionScratch {
    pub(crate) score_only: ScoreOnlyBuffer,
    pub(crate) traceback: TracebackBuffer,
    pub(crate) hgap: Vec<Score>,
}

impl ExtensionScratch {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Exact alignment of one (query, target) pair around anchor segments.
pub struct BandedExtender<'a, M: ScoreMatrix, C: BiasCorrection> {
    query: &'a [Letter],
    target: &'a [Letter],
    matrix: &'a M,
    bias: &'a C,
    config: ExtensionConfig,
    diagnostics: Option<&'a DiagnosticCounters>,
}

impl<'a, M: ScoreMatrix, C: BiasCorrection> BandedExtender<'a, M, C> {
    pub fn new(
        query: &'a [Letter],
        target: &'a [Letter],
        matrix: &'a M,
        bias: &'a C,
        config: ExtensionConfig,
    ) -> Self {
        Self {
            query,
            target,
            matrix,
            bias,
            config,
            diagnostics: None,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Option<&'a DiagnosticCounters>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Use a band of at least `band` diagonals on each side.
    pub fn with_min_band(mut self, band: Loc) -> Self {
        self.config.band = self.config.band.max(band);
        self
    }

    fn scan(&self, anchor: &DiagonalSegment, dir: Direction) -> BandedScan<'a, M, C> {
        let (qo, to) = match dir {
            Direction::Left => (anchor.query_start, anchor.target_start),
            Direction::Right => (anchor.query_end(), anchor.target_end()),
        };
        BandedScan {
            query: DirSeq::new(self.query, qo as usize, dir),
            target: DirSeq::new(self.target, to as usize, dir),
            matrix: self.matrix,
            bias: self.bias,
            band: self.config.band.max(0) as usize,
            x_drop: self.config.x_drop,
        }
    }

    fn anchor_score(&self, anchor: &DiagonalSegment) -> Score {
        let qs = anchor.query_start as usize;
        let ts = anchor.target_start as usize;
        (0..anchor.len.max(0) as usize)
            .map(|k| {
                self.matrix.score(self.query[qs + k], self.target[ts + k])
                    + self.bias.correction(qs + k)
            })
            .sum()
    }

    /// Extend `anchor` in both directions. In traceback mode the result
    /// carries a transcript and column statistics.
    pub fn extend(&self, anchor: &DiagonalSegment, scratch: &mut ExtensionScratch) -> Result<Hsp> {
        if !anchor.lies_within(self.query, self.target) {
            return Err(AlignError::SegmentOutOfBounds { index: 0 });
        }
        let left = self.scan(anchor, Direction::Left);
        let right = self.scan(anchor, Direction::Right);
        let anchor_score = self.anchor_score(anchor);

        let mut hsp = Hsp::default();
        let (l, r) = match self.config.mode {
            ExtensionMode::ScoreOnly => {
                let l = left.fill(&mut scratch.score_only, &mut scratch.hgap);
                let r = right.fill(&mut scratch.score_only, &mut scratch.hgap);
                (l, r)
            }
            ExtensionMode::Traceback => {
                let traced = self.extend_with_traceback(anchor, &left, &right, scratch, &mut hsp);
                if traced.is_err() {
                    if let Some(diag) = self.diagnostics {
                        bump(&diag.traceback_failures, 1);
                    }
                }
                traced?
            }
        };

        hsp.score = l.score + anchor_score + r.score;
        hsp.query_range = Interval::new(
            anchor.query_start - l.query_len,
            anchor.query_end() + r.query_len,
        );
        hsp.target_range = Interval::new(
            anchor.target_start - l.target_len,
            anchor.target_end() + r.target_len,
        );
        if self.config.mode == ExtensionMode::Traceback {
            hsp.compute_stats(self.query, self.matrix);
        }
        debug!(
            "extended anchor q{}-t{} len {}: score {} (left {}, anchor {}, right {}), {} cells",
            anchor.query_start,
            anchor.target_start,
            anchor.len,
            hsp.score,
            l.score,
            anchor_score,
            r.score,
            l.cells + r.cells
        );
        if let Some(diag) = self.diagnostics {
            bump(&diag.extensions, 1);
            bump(&diag.dp_cells, l.cells + r.cells);
        }
        Ok(hsp)
    }

    fn extend_with_traceback(
        &self,
        anchor: &DiagonalSegment,
        left: &BandedScan<'a, M, C>,
        right: &BandedScan<'a, M, C>,
        scratch: &mut ExtensionScratch,
        hsp: &mut Hsp,
    ) -> Result<(Extension, Extension)> {
        let transcript = &mut hsp.transcript;
        transcript.clear();

        // walking back from the far end of the left extension runs forward
        let l = left.fill(&mut scratch.traceback, &mut scratch.hgap);
        left.trace_back(&scratch.traceback, &l, transcript)?;

        let qs = anchor.query_start as usize;
        let ts = anchor.target_start as usize;
        for k in 0..anchor.len.max(0) as usize {
            let t = self.target[ts + k];
            if self.query[qs + k] == t {
                transcript.push(EditOp::Match);
            } else {
                transcript.push_letter(EditOp::Substitution, t);
            }
        }

        let r = right.fill(&mut scratch.traceback, &mut scratch.hgap);
        let mark = transcript.mark();
        right.trace_back(&scratch.traceback, &r, transcript)?;
        transcript.reverse_from(mark);
        transcript.finish();
        Ok((l, r))
    }
}
