//! Task-level driver: chain the seeds of one (query, target) pair, merge the
//! chains and refine them into exact alignments. Batches run on the rayon
//! pool with one [`Scratch`] per worker.

use log::{debug, warn};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::align::result::Hsp;
use crate::align::sw_banded::{
    BandedExtender, BiasCorrection, ExtensionScratch, NoCorrection, QueryBiasCorrection,
};
use crate::chaining::approx::ApproxHsp;
use crate::chaining::segment::DiagonalSegment;
use crate::chaining::{ChainAligner, ChainScratch};
use crate::common::Letter;
use crate::config::{ExtensionMode, SearchConfig};
use crate::diagnostics::{bump, DiagnosticCounters};
use crate::error::{AlignError, Result};
use crate::post::{drop_enveloped, merge_chains};
use crate::utils::matrix::ScoreMatrix;

/// Per-worker state reused across tasks.
#[derive(Debug, Default)]
pub struct Scratch {
    pub chain: ChainScratch,
    pub extension: ExtensionScratch,
}

/// Seed segment tagged with the frame (strand or reading frame) it was
/// found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSegment {
    pub frame: i32,
    pub seg: DiagonalSegment,
}

/// One (query, target) pair with its seeds.
#[derive(Debug, Clone, Default)]
pub struct AlignTask {
    pub id: usize,
    pub query: Vec<Letter>,
    pub target: Vec<Letter>,
    pub seeds: Vec<FrameSegment>,
    pub bias: Option<QueryBiasCorrection>,
}

impl AlignTask {
    /// Task whose seeds all belong to frame 0.
    pub fn new(
        id: usize,
        query: Vec<Letter>,
        target: Vec<Letter>,
        segments: &[DiagonalSegment],
    ) -> Self {
        Self {
            id,
            query,
            target,
            seeds: segments
                .iter()
                .map(|&seg| FrameSegment { frame: 0, seg })
                .collect(),
            bias: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskResult {
    pub id: usize,
    /// Chains after merging, best first
    pub chains: Vec<ApproxHsp>,
    /// Refined alignments, or chain-level alignments when refinement is off
    pub hsps: Vec<Hsp>,
}

/// Run one task.
pub fn align_task<M: ScoreMatrix>(
    task: &AlignTask,
    matrix: &M,
    config: &SearchConfig,
    scratch: &mut Scratch,
    diagnostics: Option<&DiagnosticCounters>,
) -> Result<TaskResult> {
    if let Some(diag) = diagnostics {
        bump(&diag.tasks, 1);
    }
    for (index, s) in task.seeds.iter().enumerate() {
        if !s.seg.lies_within(&task.query, &task.target) {
            return Err(AlignError::SegmentOutOfBounds { index });
        }
    }

    let mut by_frame: FxHashMap<i32, Vec<DiagonalSegment>> = FxHashMap::default();
    for s in &task.seeds {
        by_frame.entry(s.frame).or_default().push(s.seg);
    }
    let mut frames: Vec<i32> = by_frame.keys().copied().collect();
    frames.sort_unstable();

    let chain_transcripts = !config.refine && config.extension.mode == ExtensionMode::Traceback;
    let mut chains = Vec::new();
    let mut chain_hsps = Vec::new();
    for frame in frames {
        let segments = &by_frame[&frame];
        let out = ChainAligner::new(&task.query, &task.target, matrix, &config.chaining)
            .with_frame(frame)
            .with_diagnostics(diagnostics)
            .run(segments, &mut scratch.chain, chain_transcripts)?;
        chains.extend(out.chains);
        chain_hsps.extend(out.hsps);
    }

    if !config.refine {
        debug!("task {}: {} chains, not refined", task.id, chains.len());
        if let Some(diag) = diagnostics {
            bump(&diag.hsps_reported, chain_hsps.len());
        }
        return Ok(TaskResult {
            id: task.id,
            chains,
            hsps: chain_hsps,
        });
    }

    if config.merge_chains {
        let (merged, merges) = merge_chains(chains, matrix, config.chaining.space_penalty);
        chains = merged;
        if let Some(diag) = diagnostics {
            bump(&diag.chains_merged, merges);
        }
    }

    let hsps = match &task.bias {
        Some(bias) => refine(task, &chains, matrix, bias, config, scratch, diagnostics)?,
        None => refine(task, &chains, matrix, &NoCorrection, config, scratch, diagnostics)?,
    };
    let hsps = drop_enveloped(hsps);
    debug!(
        "task {}: {} chains, {} alignments",
        task.id,
        chains.len(),
        hsps.len()
    );
    if let Some(diag) = diagnostics {
        bump(&diag.hsps_reported, hsps.len());
    }
    Ok(TaskResult {
        id: task.id,
        chains,
        hsps,
    })
}

/// Extend each chain from its highest-scoring segment, with a band wide
/// enough to cover every diagonal the chain visits.
fn refine<M: ScoreMatrix, C: BiasCorrection>(
    task: &AlignTask,
    chains: &[ApproxHsp],
    matrix: &M,
    bias: &C,
    config: &SearchConfig,
    scratch: &mut Scratch,
    diagnostics: Option<&DiagnosticCounters>,
) -> Result<Vec<Hsp>> {
    let mut hsps = Vec::with_capacity(chains.len());
    for chain in chains {
        let anchor = chain.max_diag.seg;
        let d = anchor.diag();
        let spread = (chain.d_max - d)
            .max(d - chain.d_min)
            .max(chain.max_diag.diag_spread());
        let hsp = BandedExtender::new(&task.query, &task.target, matrix, bias, config.extension)
            .with_min_band(spread)
            .with_diagnostics(diagnostics)
            .extend(&anchor, &mut scratch.extension)?
            .with_frame(chain.frame);
        hsps.push(hsp);
    }
    Ok(hsps)
}

/// Run `tasks` in parallel. Every task gets its own result; a failing task
/// does not affect the others.
pub fn align_batch<M: ScoreMatrix>(
    tasks: &[AlignTask],
    matrix: &M,
    config: &SearchConfig,
    diagnostics: Option<&DiagnosticCounters>,
) -> Vec<Result<TaskResult>> {
    if let Err(e) = config.validate() {
        return tasks.iter().map(|_| Err(e.clone())).collect();
    }
    tasks
        .par_iter()
        .map_init(Scratch::default, |scratch, task| {
            let result = align_task(task, matrix, config, scratch, diagnostics);
            if let Err(e) = &result {
                warn!("task {} failed: {}", task.id, e);
                if let Some(diag) = diagnostics {
                    bump(&diag.task_failures, 1);
                }
            }
            result
        })
        .collect()
}
