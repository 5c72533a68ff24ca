//! Test utilities shared by the integration tests
//!
//! - Random sequence generators with a reproducible `StdRng`
//! - Sequence pairs with known seed blocks
//! - Transcript rescoring for alignment assertions

use diagchain::align::{EditOp, Hsp};
use diagchain::chaining::DiagonalSegment;
use diagchain::common::{Letter, Loc, Score};
use diagchain::utils::matrix::ScoreMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Residues A..V of the BLOSUM62 alphabet (no ambiguity codes).
pub const STANDARD_RESIDUES: Letter = 20;

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn random_protein(rng: &mut StdRng, len: usize) -> Vec<Letter> {
    (0..len).map(|_| rng.gen_range(0..STANDARD_RESIDUES)).collect()
}

/// Query and target built from exact blocks of `block_len` residues. Between
/// block `k` and `k + 1` the diagonal shifts by `shifts[k]`: a positive shift
/// inserts residues into the query, a negative one into the target. Returns
/// both sequences and one scored segment per block.
pub fn collinear_pair<M: ScoreMatrix>(
    rng: &mut StdRng,
    block_len: usize,
    shifts: &[Loc],
    matrix: &M,
) -> (Vec<Letter>, Vec<Letter>, Vec<DiagonalSegment>) {
    let mut query = Vec::new();
    let mut target = Vec::new();
    let mut starts = Vec::new();
    for k in 0..=shifts.len() {
        starts.push((query.len() as Loc, target.len() as Loc));
        let block = random_protein(rng, block_len);
        query.extend_from_slice(&block);
        target.extend_from_slice(&block);
        if let Some(&s) = shifts.get(k) {
            let extra = random_protein(rng, s.unsigned_abs() as usize);
            if s > 0 {
                query.extend_from_slice(&extra);
            } else {
                target.extend_from_slice(&extra);
            }
        }
    }
    let segments = starts
        .into_iter()
        .map(|(i, j)| DiagonalSegment::scored(&query, &target, i, j, block_len as Loc, matrix))
        .collect();
    (query, target, segments)
}

/// Copy of `query` with random substitutions and short indels everywhere
/// except `keep`. Returns the target and where `keep.start` lands on it.
pub fn mutate_outside(
    rng: &mut StdRng,
    query: &[Letter],
    keep: std::ops::Range<usize>,
    sub_rate: f64,
    indel_rate: f64,
) -> (Vec<Letter>, Loc) {
    let mut target = Vec::with_capacity(query.len() + 16);
    let mut keep_start = 0;
    let mut i = 0;
    while i < query.len() {
        if i == keep.start {
            keep_start = target.len() as Loc;
        }
        if keep.contains(&i) {
            target.push(query[i]);
            i += 1;
            continue;
        }
        let roll: f64 = rng.gen();
        if roll < indel_rate / 2.0 {
            // target-only residues
            let n = rng.gen_range(1..=3);
            target.extend(random_protein(rng, n));
            target.push(query[i]);
            i += 1;
        } else if roll < indel_rate {
            // skip query residues, but never into the kept block
            let n = rng.gen_range(1..=3);
            i = (i + n).min(if i < keep.start { keep.start } else { query.len() });
        } else if roll < indel_rate + sub_rate {
            target.push(rng.gen_range(0..STANDARD_RESIDUES));
            i += 1;
        } else {
            target.push(query[i]);
            i += 1;
        }
    }
    (target, keep_start)
}

/// Rescore an alignment from its transcript. Gap runs cost
/// `gap_open + length * gap_extend`. Panics if the transcript does not
/// walk exactly over the reported ranges or a deletion letter does not match
/// the target.
pub fn transcript_score<M: ScoreMatrix>(
    hsp: &Hsp,
    query: &[Letter],
    target: &[Letter],
    matrix: &M,
) -> Score {
    let mut qi = hsp.query_range.begin as usize;
    let mut ti = hsp.target_range.begin as usize;
    let mut score = 0;
    let mut prev = None;
    for c in hsp.transcript.iter() {
        match c.op {
            EditOp::Match | EditOp::Substitution => {
                for _ in 0..c.count {
                    if c.op == EditOp::Match {
                        assert_eq!(query[qi], target[ti], "match at q{} t{}", qi, ti);
                    }
                    score += matrix.score(query[qi], target[ti]);
                    qi += 1;
                    ti += 1;
                }
            }
            EditOp::Insertion => {
                score -= matrix.gap_open() + c.count as Score * matrix.gap_extend();
                qi += c.count as usize;
            }
            EditOp::Deletion => {
                assert_eq!(c.letter, Some(target[ti]), "deletion letter at t{}", ti);
                if prev != Some(EditOp::Deletion) {
                    score -= matrix.gap_open();
                }
                score -= matrix.gap_extend();
                ti += 1;
            }
            EditOp::FrameshiftForward | EditOp::FrameshiftReverse => {}
        }
        prev = Some(c.op);
    }
    assert_eq!(qi as Loc, hsp.query_range.end, "query end");
    assert_eq!(ti as Loc, hsp.target_range.end, "target end");
    score
}

/// Every gap run of the transcript with its length, in order.
pub fn gap_runs(hsp: &Hsp) -> Vec<(EditOp, u32)> {
    let mut runs: Vec<(EditOp, u32)> = Vec::new();
    let mut prev = None;
    for c in hsp.transcript.iter() {
        match c.op {
            EditOp::Insertion => runs.push((EditOp::Insertion, c.count)),
            EditOp::Deletion if prev == Some(EditOp::Deletion) => {
                if let Some(last) = runs.last_mut() {
                    last.1 += 1;
                }
            }
            EditOp::Deletion => runs.push((EditOp::Deletion, 1)),
            _ => {}
        }
        prev = Some(c.op);
    }
    runs
}
