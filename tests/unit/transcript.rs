//! Tests for align/transcript.rs

use diagchain::align::transcript::MAX_RUN;
use diagchain::align::{CombinedOperation, EditOp, PackedTranscript};
use rand::Rng;

use super::helpers::rng;

/// Append one logical operation to the expected decode, joining run ops
/// with an equal predecessor the way the merging iterator does.
fn expect(ops: &mut Vec<CombinedOperation>, op: EditOp, count: u32, letter: Option<u8>) {
    if op.is_run() {
        if let Some(last) = ops.last_mut() {
            if last.op == op {
                last.count += count;
                return;
            }
        }
    }
    ops.push(CombinedOperation { op, count, letter });
}

#[test]
fn test_random_scripts_round_trip() {
    let mut rng = rng(7);
    for _ in 0..200 {
        let mut t = PackedTranscript::new();
        let mut expected = Vec::new();
        for _ in 0..rng.gen_range(1..40) {
            match rng.gen_range(0..6) {
                0 | 1 => {
                    let n = rng.gen_range(1..300);
                    t.push_run(EditOp::Match, n);
                    expect(&mut expected, EditOp::Match, n, None);
                }
                2 => {
                    let n = rng.gen_range(1..150);
                    t.push_run(EditOp::Insertion, n);
                    expect(&mut expected, EditOp::Insertion, n, None);
                }
                3 => {
                    let letter = rng.gen_range(0..25);
                    t.push_letter(EditOp::Deletion, letter);
                    expect(&mut expected, EditOp::Deletion, 1, Some(letter));
                }
                4 => {
                    let letter = rng.gen_range(0..25);
                    t.push_letter(EditOp::Substitution, letter);
                    expect(&mut expected, EditOp::Substitution, 1, Some(letter));
                }
                _ => {
                    let forward = rng.gen_bool(0.5);
                    t.push_frameshift(forward);
                    let op = if forward {
                        EditOp::FrameshiftForward
                    } else {
                        EditOp::FrameshiftReverse
                    };
                    expect(&mut expected, op, 1, None);
                }
            }
        }
        t.finish();
        let decoded: Vec<CombinedOperation> = t.iter().collect();
        assert_eq!(decoded, expected);
        // saturated units never exceed the payload width
        assert!(t.units().iter().all(|u| u.count() <= MAX_RUN as u32));
    }
}

#[test]
fn test_long_run_splits_into_saturated_units() {
    let mut t = PackedTranscript::new();
    t.push_run(EditOp::Match, 200);
    t.finish();
    // 63 + 63 + 63 + 11 and the terminator
    assert_eq!(t.len(), 5);
    assert_eq!(t.units()[3].count(), 11);
    assert!(t.units()[4].is_terminator());
    assert_eq!(t.to_cigar(), "200=");
}

#[test]
fn test_frameshifts_never_merge() {
    let mut t = PackedTranscript::new();
    t.push_frameshift(true);
    t.push_frameshift(true);
    t.push_run(EditOp::Match, 3);
    t.push_frameshift(false);
    t.finish();
    let ops: Vec<EditOp> = t.iter().map(|c| c.op).collect();
    assert_eq!(
        ops,
        vec![
            EditOp::FrameshiftForward,
            EditOp::FrameshiftForward,
            EditOp::Match,
            EditOp::FrameshiftReverse
        ]
    );
    assert_eq!(t.to_cigar(), "2/3=1\\");
}

#[test]
fn test_reverse_suffix_keeps_prefix() {
    let mut t = PackedTranscript::new();
    t.push_run(EditOp::Match, 5);
    let mark = t.mark();
    t.push_run(EditOp::Match, 2);
    t.push_letter(EditOp::Deletion, 4);
    t.push_run(EditOp::Insertion, 3);
    t.reverse_from(mark);
    t.finish();
    assert_eq!(t.to_cigar(), "5=3I1D2=");
}

#[test]
fn test_empty_transcript() {
    let mut t = PackedTranscript::new();
    assert!(t.is_empty());
    t.finish();
    assert!(t.is_empty());
    assert_eq!(t.iter().count(), 0);
    assert_eq!(t.to_cigar(), "");
}
