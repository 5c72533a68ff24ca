use crate::align::transcript::{EditOp, PackedTranscript};
use crate::common::{Interval, Letter, Loc, Score};
use crate::utils::matrix::ScoreMatrix;

/// Exact alignment with statistics and packed edit script.
///
/// Ranges are 0-based half-open. Statistics are derived from the transcript
/// by [`Hsp::compute_stats`]; a score-only Hsp keeps them at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hsp {
    /// Raw alignment score
    pub score: Score,
    /// Reading frame or strand the alignment belongs to
    pub frame: i32,
    pub query_range: Interval,
    pub target_range: Interval,
    /// Number of columns including gaps
    pub length: Loc,
    pub identities: Loc,
    pub mismatches: Loc,
    /// Columns with a positive substitution score
    pub positives: Loc,
    pub gap_openings: Loc,
    /// Total gap columns
    pub gaps: Loc,
    pub transcript: PackedTranscript,
}

impl Hsp {
    pub fn new(score: Score, query_range: Interval, target_range: Interval) -> Self {
        Self {
            score,
            query_range,
            target_range,
            ..Default::default()
        }
    }

    pub fn with_frame(mut self, frame: i32) -> Self {
        self.frame = frame;
        self
    }

    pub fn has_transcript(&self) -> bool {
        !self.transcript.is_empty()
    }

    /// Recompute the column statistics by walking the transcript over the
    /// query letters starting at `query_range.begin`.
    pub fn compute_stats<M: ScoreMatrix>(&mut self, query: &[Letter], matrix: &M) {
        self.length = 0;
        self.identities = 0;
        self.mismatches = 0;
        self.positives = 0;
        self.gap_openings = 0;
        self.gaps = 0;

        let mut qpos = self.query_range.begin as usize;
        let mut prev: Option<EditOp> = None;
        for c in self.transcript.iter() {
            let n = c.count as Loc;
            match c.op {
                EditOp::Match => {
                    self.identities += n;
                    self.positives += n;
                    self.length += n;
                    qpos += c.count as usize;
                }
                EditOp::Substitution => {
                    self.mismatches += 1;
                    self.length += 1;
                    if let (Some(&q), Some(t)) = (query.get(qpos), c.letter) {
                        if matrix.score(q, t) > 0 {
                            self.positives += 1;
                        }
                    }
                    qpos += 1;
                }
                EditOp::Insertion => {
                    if prev != Some(EditOp::Insertion) {
                        self.gap_openings += 1;
                    }
                    self.gaps += n;
                    self.length += n;
                    qpos += c.count as usize;
                }
                EditOp::Deletion => {
                    if prev != Some(EditOp::Deletion) {
                        self.gap_openings += 1;
                    }
                    self.gaps += 1;
                    self.length += 1;
                }
                EditOp::FrameshiftForward | EditOp::FrameshiftReverse => {}
            }
            prev = Some(c.op);
        }
    }

    /// True if both ranges lie inside `other`'s ranges.
    pub fn is_enveloped_by(&self, other: &Hsp) -> bool {
        other.query_range.includes(&self.query_range)
            && other.target_range.includes(&self.target_range)
    }
}
