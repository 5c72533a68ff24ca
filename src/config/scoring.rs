use crate::common::Score;
use crate::utils::matrix::{Blosum62, Matrix, MatrixKind, NucleotideMatrix};

/// Scoring specification: matrix choice plus gap costs.
///
/// A gap of length `L` costs `gap_open + L * gap_extend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringSpec {
    pub matrix: MatrixKind,
    pub gap_open: Score,
    pub gap_extend: Score,
    /// Nucleotide match reward
    pub reward: Score,
    /// Nucleotide mismatch penalty (negative)
    pub penalty: Score,
}

impl Default for ScoringSpec {
    fn default() -> Self {
        Self::for_kind(MatrixKind::Blosum62)
    }
}

impl ScoringSpec {
    /// Defaults for the given matrix kind.
    pub fn for_kind(matrix: MatrixKind) -> Self {
        match matrix {
            MatrixKind::Blosum62 => {
                let m = Blosum62::default();
                Self {
                    matrix,
                    gap_open: m.gap_open,
                    gap_extend: m.gap_extend,
                    reward: 0,
                    penalty: 0,
                }
            }
            MatrixKind::Nucleotide => {
                let m = NucleotideMatrix::default();
                Self {
                    matrix,
                    gap_open: m.gap_open,
                    gap_extend: m.gap_extend,
                    reward: m.reward,
                    penalty: m.penalty,
                }
            }
        }
    }

    pub fn build(&self) -> Matrix {
        match self.matrix {
            MatrixKind::Blosum62 => Matrix::Blosum62(Blosum62::new(self.gap_open, self.gap_extend)),
            MatrixKind::Nucleotide => Matrix::Nucleotide(NucleotideMatrix {
                reward: self.reward,
                penalty: self.penalty,
                gap_open: self.gap_open,
                gap_extend: self.gap_extend,
            }),
        }
    }
}
