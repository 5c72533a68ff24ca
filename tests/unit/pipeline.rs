//! Tests for pipeline.rs and diagnostics.rs

use std::sync::atomic::Ordering;

use diagchain::align::{EditOp, QueryBiasCorrection};
use diagchain::chaining::DiagonalSegment;
use diagchain::config::SearchConfig;
use diagchain::diagnostics::{diagnostics_enabled, DiagnosticCounters};
use diagchain::error::AlignError;
use diagchain::pipeline::{align_batch, align_task, AlignTask, FrameSegment, Scratch};
use diagchain::utils::matrix::{encode_protein, Blosum62, ScoreMatrix};

use super::helpers::{collinear_pair, rng, transcript_score};

const A: &[u8] = b"MKTAYIAKQRQISFVKSHFS";

#[test]
fn test_perfect_anchor_end_to_end() {
    let m = Blosum62::default();
    let q = encode_protein(A);
    let seed = DiagonalSegment::scored(&q, &q, 0, 0, 20, &m);
    let task = AlignTask::new(0, q.clone(), q, &[seed]);
    let out = align_task(&task, &m, &SearchConfig::default(), &mut Scratch::default(), None)
        .unwrap();

    assert_eq!(out.hsps.len(), 1);
    let hsp = &out.hsps[0];
    assert_eq!(hsp.identities, 20);
    assert_eq!(hsp.mismatches, 0);
    assert_eq!(hsp.gaps, 0);
    assert_eq!(hsp.score, 99);
    let ops: Vec<(EditOp, u32)> = hsp.transcript.iter().map(|c| (c.op, c.count)).collect();
    assert_eq!(ops, vec![(EditOp::Match, 20)]);
}

#[test]
fn test_split_chains_merge_before_refinement() {
    let m = Blosum62::default();
    let mut rng = rng(31);
    let (q, t, segs) = collinear_pair(&mut rng, 25, &[1], &m);
    let task = AlignTask::new(1, q.clone(), t.clone(), &segs);
    let mut config = SearchConfig::default();
    // backtrace cuts the chain at the shift
    config.chaining.max_shift = 0;
    let expected = segs[0].score + segs[1].score - m.gap_cost(1);

    let out = align_task(&task, &m, &config, &mut Scratch::default(), None).unwrap();
    assert_eq!(out.chains.len(), 1);
    assert_eq!(out.chains[0].score, segs[0].score + segs[1].score - 1);
    assert_eq!(out.hsps.len(), 1);
    assert_eq!(out.hsps[0].score, expected);
    assert_eq!(transcript_score(&out.hsps[0], &q, &t, &m), expected);

    // without merging both chains refine to the same alignment, which is
    // reported once
    config.merge_chains = false;
    let out = align_task(&task, &m, &config, &mut Scratch::default(), None).unwrap();
    assert_eq!(out.chains.len(), 2);
    assert_eq!(out.hsps.len(), 1);
    assert_eq!(out.hsps[0].score, expected);
}

#[test]
fn test_refined_chain_covers_all_blocks() {
    let m = Blosum62::default();
    let mut rng = rng(32);
    let shifts = [2, -3, 1];
    let (q, t, segs) = collinear_pair(&mut rng, 25, &shifts, &m);
    let mut task = AlignTask::new(2, q.clone(), t.clone(), &segs);
    task.seeds.iter_mut().for_each(|s| s.frame = -1);

    let out = align_task(&task, &m, &SearchConfig::default(), &mut Scratch::default(), None)
        .unwrap();
    assert_eq!(out.hsps.len(), 1);
    let hsp = &out.hsps[0];
    let chain_score: i32 = segs.iter().map(|s| s.score).sum::<i32>()
        - shifts.iter().map(|s| m.gap_cost(s.abs())).sum::<i32>();
    assert_eq!(hsp.frame, -1);
    assert_eq!(hsp.score, chain_score);
    assert_eq!(hsp.query_range.length() as usize, q.len());
    assert_eq!(hsp.target_range.length() as usize, t.len());
    assert_eq!(hsp.gap_openings, 3);
    assert_eq!(hsp.gaps, 6);
    assert_eq!(transcript_score(hsp, &q, &t, &m), hsp.score);
}

#[test]
fn test_bias_lowers_refined_score() {
    let m = Blosum62::default();
    let q = encode_protein(A);
    let seed = DiagonalSegment::scored(&q, &q, 0, 0, 20, &m);
    let mut task = AlignTask::new(0, q.clone(), q, &[seed]);
    task.bias = Some(QueryBiasCorrection::new(vec![-1; 20]));
    let out = align_task(&task, &m, &SearchConfig::default(), &mut Scratch::default(), None)
        .unwrap();
    assert_eq!(out.hsps[0].score, 99 - 20);
}

#[test]
fn test_batch_isolates_failures() {
    let m = Blosum62::default();
    let q = encode_protein(A);
    let good = AlignTask::new(
        0,
        q.clone(),
        q.clone(),
        &[DiagonalSegment::scored(&q, &q, 0, 0, 20, &m)],
    );
    let mut bad = AlignTask::new(1, q.clone(), q.clone(), &[]);
    bad.seeds.push(FrameSegment {
        frame: 0,
        seg: DiagonalSegment::new(15, 15, 10, 40),
    });

    let counters = DiagnosticCounters::default();
    let results = align_batch(&[good, bad], &m, &SearchConfig::default(), Some(&counters));
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().map(|r| r.hsps.len()), Ok(1));
    assert_eq!(
        results[1].as_ref().map(|r| r.id),
        Err(&AlignError::SegmentOutOfBounds { index: 0 })
    );
    assert_eq!(counters.tasks.load(Ordering::Relaxed), 2);
    assert_eq!(counters.task_failures.load(Ordering::Relaxed), 1);
    assert_eq!(counters.extensions.load(Ordering::Relaxed), 1);
    assert_eq!(counters.hsps_reported.load(Ordering::Relaxed), 1);
    assert_eq!(counters.dp_cells.load(Ordering::Relaxed), 0);
}

#[test]
fn test_invalid_config_fails_every_task() {
    let m = Blosum62::default();
    let q = encode_protein(A);
    let tasks = vec![
        AlignTask::new(0, q.clone(), q.clone(), &[]),
        AlignTask::new(1, q.clone(), q, &[]),
    ];
    let mut config = SearchConfig::default();
    config.extension.x_drop = 0;
    let results = align_batch(&tasks, &m, &config, None);
    assert!(results
        .iter()
        .all(|r| matches!(r, Err(AlignError::InvalidConfig(_)))));
}

#[test]
fn test_scoring_spec_drives_matrix() {
    let mut config = SearchConfig::default();
    config.scoring.gap_open = 5;
    config.scoring.gap_extend = 2;
    let m = config.scoring.build();
    assert_eq!(m.gap_cost(3), 11);
}

#[test]
fn test_diagnostics_enabled() {
    std::env::remove_var("DIAGCHAIN_DIAGNOSTICS");
    assert!(!diagnostics_enabled());
    std::env::set_var("DIAGCHAIN_DIAGNOSTICS", "1");
    assert!(diagnostics_enabled());
    std::env::set_var("DIAGCHAIN_DIAGNOSTICS", "TRUE");
    assert!(diagnostics_enabled());
    std::env::set_var("DIAGCHAIN_DIAGNOSTICS", "0");
    assert!(!diagnostics_enabled());
    std::env::remove_var("DIAGCHAIN_DIAGNOSTICS");
}
