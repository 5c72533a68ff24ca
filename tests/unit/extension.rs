//! Tests for the banded extender and its traceback

use diagchain::align::{
    BandedExtender, EditOp, ExtensionScratch, NoCorrection, QueryBiasCorrection,
};
use diagchain::chaining::DiagonalSegment;
use diagchain::common::{Letter, Loc, DELIMITER};
use diagchain::config::{ExtensionConfig, ExtensionMode};
use diagchain::error::AlignError;
use diagchain::utils::matrix::{encode_protein, Blosum62, ScoreMatrix};
use rand::Rng;

use super::helpers::{gap_runs, mutate_outside, random_protein, rng, transcript_score};

const A: &[u8] = b"MKTAYIAKQRQISFVKSHFS";
const B: &[u8] = b"RQLEERLGLIEVQAPILSRV";

fn config(band: Loc, mode: ExtensionMode) -> ExtensionConfig {
    ExtensionConfig {
        band,
        mode,
        ..ExtensionConfig::default()
    }
}

#[test]
fn test_perfect_anchor_any_band() {
    let q = encode_protein(A);
    let m = Blosum62::default();
    let anchor = DiagonalSegment::scored(&q, &q, 0, 0, 20, &m);
    let mut scratch = ExtensionScratch::new();
    for band in [0, 1, 8, 32] {
        let hsp = BandedExtender::new(
            &q,
            &q,
            &m,
            &NoCorrection,
            config(band, ExtensionMode::Traceback),
        )
        .extend(&anchor, &mut scratch)
        .unwrap();
        assert_eq!(hsp.identities, 20);
        assert_eq!(hsp.mismatches, 0);
        assert_eq!(hsp.gaps, 0);
        assert_eq!(hsp.score, anchor.score);
        let ops: Vec<(EditOp, u32)> = hsp.transcript.iter().map(|c| (c.op, c.count)).collect();
        assert_eq!(ops, vec![(EditOp::Match, 20)]);
    }
}

#[test]
fn test_score_only_and_traceback_agree() {
    let m = Blosum62::default();
    let mut rng = rng(21);
    let mut scratch = ExtensionScratch::new();
    for _ in 0..60 {
        let len = rng.gen_range(80..160);
        let query = random_protein(&mut rng, len);
        let keep_start = rng.gen_range(10..len - 30);
        let keep = keep_start..keep_start + 20;
        let (target, anchor_t) = mutate_outside(&mut rng, &query, keep, 0.15, 0.05);
        let anchor = DiagonalSegment::scored(&query, &target, keep_start as Loc, anchor_t, 20, &m);

        let band = rng.gen_range(4..40);
        let fast = BandedExtender::new(
            &query,
            &target,
            &m,
            &NoCorrection,
            config(band, ExtensionMode::ScoreOnly),
        )
        .extend(&anchor, &mut scratch)
        .unwrap();
        let full = BandedExtender::new(
            &query,
            &target,
            &m,
            &NoCorrection,
            config(band, ExtensionMode::Traceback),
        )
        .extend(&anchor, &mut scratch)
        .unwrap();

        assert_eq!(fast.score, full.score);
        assert_eq!(fast.query_range, full.query_range);
        assert_eq!(fast.target_range, full.target_range);
        assert!(!fast.has_transcript());
        assert!(full.has_transcript());
        assert!(full.score >= anchor.score);

        // every gap run is charged open + length * extend
        assert_eq!(transcript_score(&full, &query, &target, &m), full.score);
        let runs = gap_runs(&full);
        assert_eq!(full.gap_openings as usize, runs.len());
        assert_eq!(full.gaps as u32, runs.iter().map(|r| r.1).sum::<u32>());
    }
}

#[test]
fn test_band_limits_reachable_gaps() {
    let q = encode_protein(&[A, B].concat());
    let t = encode_protein(&[A, b"GGGGG".as_slice(), B].concat());
    let m = Blosum62::default();
    let anchor = DiagonalSegment::scored(&q, &t, 0, 0, 20, &m);
    let mut scratch = ExtensionScratch::new();

    let wide = BandedExtender::new(&q, &t, &m, &NoCorrection, config(8, ExtensionMode::Traceback))
        .extend(&anchor, &mut scratch)
        .unwrap();
    assert_eq!(wide.transcript.to_cigar(), "20=5D20=");
    assert_eq!(wide.score, 99 + 93 - m.gap_cost(5));
    assert_eq!(wide.gap_openings, 1);
    assert_eq!(wide.gaps, 5);

    let narrow = BandedExtender::new(&q, &t, &m, &NoCorrection, config(2, ExtensionMode::Traceback))
        .extend(&anchor, &mut scratch)
        .unwrap();
    assert!(narrow.score < wide.score);
    assert_eq!(transcript_score(&narrow, &q, &t, &m), narrow.score);

    // the chain band widens the configured one
    let narrow_config = config(2, ExtensionMode::Traceback);
    let widened = BandedExtender::new(&q, &t, &m, &NoCorrection, narrow_config)
        .with_min_band(5)
        .extend(&anchor, &mut scratch)
        .unwrap();
    assert_eq!(widened.score, wide.score);
}

#[test]
fn test_delimiter_stops_extension() {
    let mut q: Vec<Letter> = encode_protein(A);
    q.push(DELIMITER);
    q.extend(encode_protein(B));
    let t = encode_protein(&[A, B].concat());
    let m = Blosum62::default();
    let anchor = DiagonalSegment::scored(&q, &t, 0, 0, 20, &m);
    let hsp = BandedExtender::new(&q, &t, &m, &NoCorrection, config(8, ExtensionMode::Traceback))
        .extend(&anchor, &mut ExtensionScratch::new())
        .unwrap();
    assert_eq!(hsp.query_range.end, 20);
    assert_eq!(hsp.target_range.end, 20);
    assert_eq!(hsp.score, anchor.score);
}

#[test]
fn test_x_drop_boundary() {
    // right of the anchor the running score dips to exactly -10, then recovers
    let q = encode_protein(&[A, b"WWWWW".as_slice()].concat());
    let t = encode_protein(&[A, b"DDCWW".as_slice()].concat());
    let m = Blosum62::default();
    let anchor = DiagonalSegment::scored(&q, &t, 0, 0, 20, &m);
    assert_eq!(anchor.score, 99);
    let mut scratch = ExtensionScratch::new();

    let at_limit = ExtensionConfig {
        x_drop: 10,
        ..config(0, ExtensionMode::ScoreOnly)
    };
    let hsp = BandedExtender::new(&q, &t, &m, &NoCorrection, at_limit)
        .extend(&anchor, &mut scratch)
        .unwrap();
    assert_eq!(hsp.score, 111);
    assert_eq!(hsp.query_range.end, 25);

    let below_limit = ExtensionConfig {
        x_drop: 9,
        ..config(0, ExtensionMode::ScoreOnly)
    };
    let hsp = BandedExtender::new(&q, &t, &m, &NoCorrection, below_limit)
        .extend(&anchor, &mut scratch)
        .unwrap();
    assert_eq!(hsp.score, 99);
    assert_eq!(hsp.query_range.end, 20);
}

#[test]
fn test_bias_correction_applies_per_query_position() {
    let q = encode_protein(A);
    let m = Blosum62::default();
    let anchor = DiagonalSegment::scored(&q, &q, 0, 0, 20, &m);
    let mut values = vec![0; 20];
    values[3] = -2;
    values[10] = -3;
    let bias = QueryBiasCorrection::new(values);
    let hsp = BandedExtender::new(&q, &q, &m, &bias, config(4, ExtensionMode::ScoreOnly))
        .extend(&anchor, &mut ExtensionScratch::new())
        .unwrap();
    assert_eq!(hsp.score, anchor.score - 5);
}

#[test]
fn test_anchor_outside_sequences() {
    let q = encode_protein(A);
    let m = Blosum62::default();
    let anchor = DiagonalSegment::new(10, 10, 15, 50);
    let err = BandedExtender::new(&q, &q, &m, &NoCorrection, ExtensionConfig::default())
        .extend(&anchor, &mut ExtensionScratch::new())
        .unwrap_err();
    assert_eq!(err, AlignError::SegmentOutOfBounds { index: 0 });
}

#[test]
fn test_anchor_across_delimiter() {
    let mut q: Vec<Letter> = encode_protein(A);
    q.push(DELIMITER);
    q.extend(encode_protein(B));
    let m = Blosum62::default();
    let anchor = DiagonalSegment::new(15, 15, 10, 40);
    let err = BandedExtender::new(&q, &q, &m, &NoCorrection, ExtensionConfig::default())
        .extend(&anchor, &mut ExtensionScratch::new())
        .unwrap_err();
    assert_eq!(err, AlignError::SegmentOutOfBounds { index: 0 });
}
