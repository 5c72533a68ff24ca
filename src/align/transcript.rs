//! Packed edit transcript.
//!
//! Each unit is one byte: a 2-bit operation code in the high bits and a
//! 6-bit payload. Match and insertion units carry a run count (1..=63),
//! deletion and substitution units carry the target letter. Frameshifts are
//! substitution units whose letter lies outside every alphabet (62 and 63).
//! A zero-count match unit terminates the script.

use std::fmt;

use crate::common::{Letter, LETTER_LIMIT};

const OP_MATCH: u8 = 0;
const OP_INSERTION: u8 = 1;
const OP_DELETION: u8 = 2;
const OP_SUBSTITUTION: u8 = 3;

/// Largest run count a single unit can hold.
pub const MAX_RUN: u8 = 63;

pub const FRAMESHIFT_FORWARD_LETTER: Letter = LETTER_LIMIT;
pub const FRAMESHIFT_REVERSE_LETTER: Letter = LETTER_LIMIT + 1;

/// Logical alignment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// Identical letters
    Match,
    /// Query letter aligned to a gap in the target
    Insertion,
    /// Target letter aligned to a gap in the query
    Deletion,
    /// Differing letters
    Substitution,
    /// +1 frame shift
    FrameshiftForward,
    /// -1 frame shift
    FrameshiftReverse,
}

impl EditOp {
    /// Run-type ops are stored as counts and merge with their neighbours.
    #[inline]
    pub fn is_run(self) -> bool {
        matches!(self, EditOp::Match | EditOp::Insertion)
    }

    fn cigar_char(self) -> char {
        match self {
            EditOp::Match => '=',
            EditOp::Insertion => 'I',
            EditOp::Deletion => 'D',
            EditOp::Substitution => 'X',
            EditOp::FrameshiftForward => '/',
            EditOp::FrameshiftReverse => '\\',
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PackedOperation(u8);

impl PackedOperation {
    #[inline]
    fn new(code: u8, payload: u8) -> Self {
        debug_assert!(payload <= MAX_RUN);
        Self((code << 6) | payload)
    }

    #[inline]
    pub fn terminator() -> Self {
        Self(0)
    }

    #[inline]
    fn code(self) -> u8 {
        self.0 >> 6
    }

    #[inline]
    fn payload(self) -> u8 {
        self.0 & MAX_RUN
    }

    #[inline]
    pub fn is_terminator(self) -> bool {
        self.0 == 0
    }

    pub fn op(self) -> EditOp {
        match self.code() {
            OP_MATCH => EditOp::Match,
            OP_INSERTION => EditOp::Insertion,
            OP_DELETION => EditOp::Deletion,
            _ => match self.payload() {
                FRAMESHIFT_FORWARD_LETTER => EditOp::FrameshiftForward,
                FRAMESHIFT_REVERSE_LETTER => EditOp::FrameshiftReverse,
                _ => EditOp::Substitution,
            },
        }
    }

    /// Run length of this unit (1 for letter units).
    #[inline]
    pub fn count(self) -> u32 {
        if self.op().is_run() {
            self.payload() as u32
        } else {
            1
        }
    }

    /// Target letter of a deletion or substitution unit.
    #[inline]
    pub fn letter(self) -> Option<Letter> {
        match self.op() {
            EditOp::Deletion | EditOp::Substitution => Some(self.payload()),
            _ => None,
        }
    }
}

impl fmt::Debug for PackedOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.op(), self.payload())
    }
}

/// One decoded operation with its total run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedOperation {
    pub op: EditOp,
    pub count: u32,
    pub letter: Option<Letter>,
}

/// Growable packed edit script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackedTranscript {
    data: Vec<PackedOperation>,
    merge_floor: usize,
}

impl PackedTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.merge_floor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty() || self.data[0].is_terminator()
    }

    /// Number of packed units, terminator included.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn units(&self) -> &[PackedOperation] {
        &self.data
    }

    /// Append one step of `op`. Letter ops need [`push_letter`](Self::push_letter).
    pub fn push(&mut self, op: EditOp) {
        match op {
            EditOp::Match | EditOp::Insertion => self.push_run(op, 1),
            EditOp::FrameshiftForward => self.push_frameshift(true),
            EditOp::FrameshiftReverse => self.push_frameshift(false),
            EditOp::Deletion | EditOp::Substitution => {
                debug_assert!(false, "{:?} needs a letter", op);
            }
        }
    }

    /// Append `count` steps of a run-type op, filling the tail unit first and
    /// splitting the rest into saturated units.
    pub fn push_run(&mut self, op: EditOp, mut count: u32) {
        debug_assert!(op.is_run());
        if count == 0 {
            return;
        }
        let code = if op == EditOp::Match {
            OP_MATCH
        } else {
            OP_INSERTION
        };
        if self.data.len() > self.merge_floor {
            if let Some(tail) = self.data.last_mut() {
                if tail.code() == code && tail.payload() > 0 && tail.payload() < MAX_RUN {
                    let add = count.min((MAX_RUN - tail.payload()) as u32);
                    *tail = PackedOperation::new(code, tail.payload() + add as u8);
                    count -= add;
                }
            }
        }
        while count > 0 {
            let n = count.min(MAX_RUN as u32);
            self.data.push(PackedOperation::new(code, n as u8));
            count -= n;
        }
    }

    /// Append a deletion or substitution of target letter `letter`.
    ///
    /// Panics if `letter` is at or above [`LETTER_LIMIT`]; such letters end a
    /// sequence and never reach an alignment column.
    pub fn push_letter(&mut self, op: EditOp, letter: Letter) {
        assert!(
            letter < LETTER_LIMIT,
            "letter {} cannot be stored in a transcript",
            letter
        );
        let code = match op {
            EditOp::Deletion => OP_DELETION,
            EditOp::Substitution => OP_SUBSTITUTION,
            _ => {
                self.push(op);
                return;
            }
        };
        self.data.push(PackedOperation::new(code, letter));
    }

    pub fn push_frameshift(&mut self, forward: bool) {
        let letter = if forward {
            FRAMESHIFT_FORWARD_LETTER
        } else {
            FRAMESHIFT_REVERSE_LETTER
        };
        self.data.push(PackedOperation::new(OP_SUBSTITUTION, letter));
    }

    /// Append the terminator unit. Nothing may be pushed afterwards.
    pub fn finish(&mut self) {
        self.data.push(PackedOperation::terminator());
    }

    /// Start a segment that will later be reversed: units pushed after this
    /// call never merge into earlier ones. Returns the segment start.
    pub fn mark(&mut self) -> usize {
        self.merge_floor = self.data.len();
        self.merge_floor
    }

    /// Reverse the order of the units from `start` to the end in place.
    pub fn reverse_from(&mut self, start: usize) {
        if start < self.data.len() {
            self.data[start..].reverse();
        }
        self.merge_floor = self.data.len();
    }

    /// Iterate logical operations, re-joining saturated runs.
    pub fn iter(&self) -> TranscriptIter<'_> {
        TranscriptIter {
            units: &self.data,
            pos: 0,
        }
    }

    /// Extended CIGAR rendering (`=`, `X`, `I`, `D`, `/`, `\`).
    pub fn to_cigar(&self) -> String {
        let mut out = String::new();
        let mut current: Option<(EditOp, u32)> = None;
        for c in self.iter() {
            match current {
                Some((op, n)) if op == c.op => current = Some((op, n + c.count)),
                Some((op, n)) => {
                    out.push_str(&format!("{}{}", n, op.cigar_char()));
                    current = Some((c.op, c.count));
                }
                None => current = Some((c.op, c.count)),
            }
        }
        if let Some((op, n)) = current {
            out.push_str(&format!("{}{}", n, op.cigar_char()));
        }
        out
    }
}

/// Merging iterator over a [`PackedTranscript`].
pub struct TranscriptIter<'a> {
    units: &'a [PackedOperation],
    pos: usize,
}

impl Iterator for TranscriptIter<'_> {
    type Item = CombinedOperation;

    fn next(&mut self) -> Option<CombinedOperation> {
        let first = *self.units.get(self.pos)?;
        if first.is_terminator() {
            return None;
        }
        self.pos += 1;
        let op = first.op();
        if !op.is_run() {
            return Some(CombinedOperation {
                op,
                count: 1,
                letter: first.letter(),
            });
        }
        let mut count = first.count();
        while let Some(&next) = self.units.get(self.pos) {
            if next.is_terminator() || next.code() != first.code() {
                break;
            }
            count += next.count();
            self.pos += 1;
        }
        Some(CombinedOperation {
            op,
            count,
            letter: None,
        })
    }
}

impl<'a> IntoIterator for &'a PackedTranscript {
    type Item = CombinedOperation;
    type IntoIter = TranscriptIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for PackedTranscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cigar())
    }
}
