//! Traceback over the stored band.
//!
//! Transitions are re-derived from the scores alone: at every cell the
//! diagonal step is tried first, then a horizontal gap of increasing length,
//! then a vertical one. Gap runs are charged `gap_open + len * gap_extend`,
//! the same costs the forward scan used.

use log::warn;

use crate::align::dp_matrix::TracebackBuffer;
use crate::align::sw_banded::{BandedScan, BiasCorrection, Extension};
use crate::align::transcript::{EditOp, PackedTranscript};
use crate::common::{Loc, Score, NEG_INF};
use crate::error::{AlignError, Result};
use crate::utils::matrix::ScoreMatrix;

impl<'a, M: ScoreMatrix, C: BiasCorrection> BandedScan<'a, M, C> {
    /// Score of the cell at query offset `r`, target offset `c`. Offset -1
    /// is the matrix boundary.
    #[inline]
    fn cell(&self, buf: &TracebackBuffer, r: isize, c: isize) -> Score {
        if r < -1 || c < -1 {
            return NEG_INF;
        }
        buf.get(r - c + self.band as isize, c)
    }

    /// Push the operations from the best cell of `ext` back to the origin,
    /// so they come out ordered from the far end towards the origin.
    pub(crate) fn trace_back(
        &self,
        buf: &TracebackBuffer,
        ext: &Extension,
        transcript: &mut PackedTranscript,
    ) -> Result<()> {
        let gap_open = self.matrix.gap_open();
        let gap_extend = self.matrix.gap_extend();
        let band = self.band as isize;
        let mut r = ext.query_len as isize - 1;
        let mut c = ext.target_len as isize - 1;

        while r >= 0 && c >= 0 {
            let s = self.cell(buf, r, c);
            let diag = if r == 0 && c == 0 {
                0
            } else {
                self.cell(buf, r - 1, c - 1)
            };
            if diag > NEG_INF && s == diag + self.match_score(r as usize, c as usize) {
                let t = self.target.get(c as usize);
                if self.query.get(r as usize) == t {
                    transcript.push(EditOp::Match);
                } else {
                    transcript.push_letter(EditOp::Substitution, t);
                }
                r -= 1;
                c -= 1;
                continue;
            }

            // the row index of (r, c - len) in its column is b + len
            let b = r - c + band;
            let max_h = c.min(2 * band - b);
            let horizontal = (1..=max_h).find(|&len| {
                let p = self.cell(buf, r, c - len);
                p > NEG_INF && s == p - gap_open - len as Score * gap_extend
            });
            if let Some(len) = horizontal {
                for k in 0..len {
                    transcript.push_letter(EditOp::Deletion, self.target.get((c - k) as usize));
                }
                c -= len;
                continue;
            }

            let max_v = r.min(b);
            let vertical = (1..=max_v).find(|&len| {
                let p = self.cell(buf, r - len, c);
                p > NEG_INF && s == p - gap_open - len as Score * gap_extend
            });
            if let Some(len) = vertical {
                transcript.push_run(EditOp::Insertion, len as u32);
                r -= len;
                continue;
            }

            let query_pos = self.query.pos(r as usize) as Loc;
            let target_pos = self.target.pos(c as usize) as Loc;
            warn!(
                "traceback inconsistency at query {} target {} (score {})",
                query_pos, target_pos, s
            );
            return Err(AlignError::TracebackInconsistency {
                query_pos,
                target_pos,
                score: s,
            });
        }

        // a gap running from the origin
        if r >= 0 {
            transcript.push_run(EditOp::Insertion, (r + 1) as u32);
        }
        for k in 0..=c {
            transcript.push_letter(EditOp::Deletion, self.target.get((c - k) as usize));
        }
        Ok(())
    }
}
