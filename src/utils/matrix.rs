//! Substitution scoring.
//!
//! Letters are indices into a fixed alphabet. Proteins use the BLOSUM62
//! order `ARNDCQEGHILKMFPSTWYVBJZX*`, nucleotides use `ACGTN`. Any letter
//! outside the alphabet (the delimiter, frameshift markers) scores
//! [`DEFSCORE`] against everything.

use std::str::FromStr;

use crate::common::{Letter, Score};

/// Score of a letter outside the alphabet.
pub const DEFSCORE: Score = -4;

pub const BLOSUM62_SIZE: usize = 25;

pub const PROTEIN_ALPHABET: &[u8; BLOSUM62_SIZE] = b"ARNDCQEGHILKMFPSTWYVBJZX*";

pub const NUCLEOTIDE_ALPHABET: &[u8; 5] = b"ACGTN";

/// Substitution score lookup consumed by chaining and DP extension.
///
/// `gap_open` and `gap_extend` follow the convention that a gap of length
/// `L` costs `gap_open + L * gap_extend`.
pub trait ScoreMatrix: Sync {
    fn score(&self, a: Letter, b: Letter) -> Score;
    fn gap_open(&self) -> Score;
    fn gap_extend(&self) -> Score;

    /// Cost of a gap run of `len` letters.
    #[inline]
    fn gap_cost(&self, len: Score) -> Score {
        if len <= 0 {
            0
        } else {
            self.gap_open() + len * self.gap_extend()
        }
    }
}

/// BLOSUM62 in `ARNDCQEGHILKMFPSTWYVBJZX*` order.
pub static BLOSUM62: [i8; BLOSUM62_SIZE * BLOSUM62_SIZE] = [
    //       A,  R,  N,  D,  C,  Q,  E,  G,  H,  I,  L,  K,  M,  F,  P,  S,  T,  W,  Y,  V,  B,  J,  Z,  X,  *
    /*A*/    4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0, -2, -1, -1, -1, -4,
    /*R*/   -1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3, -1, -2,  0, -1, -4,
    /*N*/   -2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3,  4, -3,  0, -1, -4,
    /*D*/   -2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3,  4, -3,  1, -1, -4,
    /*C*/    0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1, -3, -1, -3, -1, -4,
    /*Q*/   -1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2,  0, -2,  4, -1, -4,
    /*E*/   -1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2,  1, -3,  4, -1, -4,
    /*G*/    0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3, -1, -4, -2, -1, -4,
    /*H*/   -2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3,  0, -3,  0, -1, -4,
    /*I*/   -1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3, -3,  3, -3, -1, -4,
    /*L*/   -1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1, -4,  3, -3, -1, -4,
    /*K*/   -1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2,  0, -3,  1, -1, -4,
    /*M*/   -1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1, -3,  2, -1, -1, -4,
    /*F*/   -2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1, -3,  0, -3, -1, -4,
    /*P*/   -1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2, -2, -3, -1, -1, -4,
    /*S*/    1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2,  0, -2,  0, -1, -4,
    /*T*/    0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0, -1, -1, -1, -1, -4,
    /*W*/   -3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3, -4, -2, -2, -1, -4,
    /*Y*/   -2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1, -3, -1, -2, -1, -4,
    /*V*/    0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4, -3,  2, -2, -1, -4,
    /*B*/   -2, -1,  4,  4, -3,  0,  1, -1,  0, -3, -4,  0, -3, -3, -2,  0, -1, -4, -3, -3,  4, -3,  0, -1, -4,
    /*J*/   -1, -2, -3, -3, -1, -2, -3, -4, -3,  3,  3, -3,  2,  0, -3, -2, -1, -2, -1,  2, -3,  3, -3, -1, -4,
    /*Z*/   -1,  0,  0,  1, -3,  4,  4, -2,  0, -3, -3,  1, -1, -3, -1,  0, -1, -2, -2, -2,  0, -3,  4, -1, -4,
    /*X*/   -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -4,
    /***/   -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4,  1,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blosum62 {
    pub gap_open: Score,
    pub gap_extend: Score,
}

impl Default for Blosum62 {
    fn default() -> Self {
        Self {
            gap_open: 11,
            gap_extend: 1,
        }
    }
}

impl Blosum62 {
    pub fn new(gap_open: Score, gap_extend: Score) -> Self {
        Self {
            gap_open,
            gap_extend,
        }
    }
}

impl ScoreMatrix for Blosum62 {
    #[inline(always)]
    fn score(&self, a: Letter, b: Letter) -> Score {
        let (a, b) = (a as usize, b as usize);
        if a >= BLOSUM62_SIZE || b >= BLOSUM62_SIZE {
            return DEFSCORE;
        }
        BLOSUM62[a * BLOSUM62_SIZE + b] as Score
    }

    #[inline]
    fn gap_open(&self) -> Score {
        self.gap_open
    }

    #[inline]
    fn gap_extend(&self) -> Score {
        self.gap_extend
    }
}

/// Match reward / mismatch penalty scoring over `ACGTN`. `N` never matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NucleotideMatrix {
    pub reward: Score,
    pub penalty: Score,
    pub gap_open: Score,
    pub gap_extend: Score,
}

impl Default for NucleotideMatrix {
    fn default() -> Self {
        Self {
            reward: 2,
            penalty: -3,
            gap_open: 5,
            gap_extend: 2,
        }
    }
}

impl ScoreMatrix for NucleotideMatrix {
    #[inline(always)]
    fn score(&self, a: Letter, b: Letter) -> Score {
        if a as usize >= NUCLEOTIDE_ALPHABET.len() || b as usize >= NUCLEOTIDE_ALPHABET.len() {
            return DEFSCORE;
        }
        if a == b && a != 4 {
            self.reward
        } else {
            self.penalty
        }
    }

    #[inline]
    fn gap_open(&self) -> Score {
        self.gap_open
    }

    #[inline]
    fn gap_extend(&self) -> Score {
        self.gap_extend
    }
}

/// Runtime-selected matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matrix {
    Blosum62(Blosum62),
    Nucleotide(NucleotideMatrix),
}

impl ScoreMatrix for Matrix {
    #[inline(always)]
    fn score(&self, a: Letter, b: Letter) -> Score {
        match self {
            Matrix::Blosum62(m) => m.score(a, b),
            Matrix::Nucleotide(m) => m.score(a, b),
        }
    }

    #[inline]
    fn gap_open(&self) -> Score {
        match self {
            Matrix::Blosum62(m) => m.gap_open,
            Matrix::Nucleotide(m) => m.gap_open,
        }
    }

    #[inline]
    fn gap_extend(&self) -> Score {
        match self {
            Matrix::Blosum62(m) => m.gap_extend,
            Matrix::Nucleotide(m) => m.gap_extend,
        }
    }
}

/// Matrices selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatrixKind {
    #[default]
    Blosum62,
    Nucleotide,
}

impl FromStr for MatrixKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BLOSUM62" => Ok(MatrixKind::Blosum62),
            "NUCL" | "DNA" | "NUCLEOTIDE" => Ok(MatrixKind::Nucleotide),
            _ => Err(format!(
                "Unknown scoring matrix: {}. Use 'BLOSUM62' or 'NUCL'",
                s
            )),
        }
    }
}

/// Map an ASCII residue to its BLOSUM62 index. Unknown residues become X.
#[inline]
pub fn protein_letter(c: u8) -> Letter {
    let c = c.to_ascii_uppercase();
    match c {
        b'U' => 4,  // selenocysteine scored as C
        b'O' => 11, // pyrrolysine scored as K
        _ => PROTEIN_ALPHABET
            .iter()
            .position(|&a| a == c)
            .map_or(23, |p| p as Letter),
    }
}

/// Map an ASCII base to `ACGTN` order. `U` reads as `T`, anything else as `N`.
#[inline]
pub fn nucleotide_letter(c: u8) -> Letter {
    match c.to_ascii_uppercase() {
        b'A' => 0,
        b'C' => 1,
        b'G' => 2,
        b'T' | b'U' => 3,
        _ => 4,
    }
}

pub fn encode_protein(seq: &[u8]) -> Vec<Letter> {
    seq.iter().map(|&c| protein_letter(c)).collect()
}

pub fn encode_nucleotide(seq: &[u8]) -> Vec<Letter> {
    seq.iter().map(|&c| nucleotide_letter(c)).collect()
}

/// Encode `seq` for the given matrix kind.
pub fn encode(kind: MatrixKind, seq: &[u8]) -> Vec<Letter> {
    match kind {
        MatrixKind::Blosum62 => encode_protein(seq),
        MatrixKind::Nucleotide => encode_nucleotide(seq),
    }
}
