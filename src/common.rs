//! Shared coordinate and score types.

use std::fmt;

/// Sequence coordinate (query or target offset, diagonal, length).
pub type Loc = i32;

/// Raw alignment score.
pub type Score = i32;

/// Encoded residue (index into the scoring alphabet).
pub type Letter = u8;

/// Letter marking the end of a sequence inside a padded buffer.
pub const DELIMITER: Letter = 0xff;

/// Letters from here up cannot be stored in a transcript. Any of them ends
/// a sequence the way [`DELIMITER`] does.
pub const LETTER_LIMIT: Letter = 62;

#[inline]
pub fn is_sequence_end(letter: Letter) -> bool {
    letter >= LETTER_LIMIT
}

/// Unreachable DP cell. Kept well away from `i32::MIN` so that subtracting
/// gap costs never wraps.
pub const NEG_INF: Score = i32::MIN / 2;

/// Half-open coordinate interval `[begin, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interval {
    pub begin: Loc,
    pub end: Loc,
}

impl Interval {
    #[inline]
    pub fn new(begin: Loc, end: Loc) -> Self {
        Self { begin, end }
    }

    #[inline]
    pub fn length(&self) -> Loc {
        (self.end - self.begin).max(0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }

    /// True if `other` lies entirely inside this interval.
    #[inline]
    pub fn includes(&self, other: &Interval) -> bool {
        other.begin >= self.begin && other.end <= self.end
    }

    #[inline]
    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval::new(self.begin.max(other.begin), self.end.min(other.end))
    }

    #[inline]
    pub fn overlap(&self, other: &Interval) -> Loc {
        self.intersect(other).length()
    }

    /// Fraction of this interval covered by `other`.
    pub fn overlap_factor(&self, other: &Interval) -> f64 {
        let len = self.length();
        if len == 0 {
            return 0.0;
        }
        self.overlap(other) as f64 / len as f64
    }

    /// Smallest interval containing both.
    #[inline]
    pub fn hull(&self, other: &Interval) -> Interval {
        Interval::new(self.begin.min(other.begin), self.end.max(other.end))
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{};{})", self.begin, self.end)
    }
}
