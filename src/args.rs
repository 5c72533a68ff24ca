use clap::Args;

use crate::common::{Loc, Score};
use crate::config::{ChainingConfig, ExtensionConfig, ExtensionMode, ScoringSpec, SearchConfig};
use crate::utils::matrix::MatrixKind;

#[derive(Args, Debug)]
pub struct AlignArgs {
    /// Query sequence (residues or bases)
    #[arg(short, long)]
    pub query: String,
    /// Target sequence
    #[arg(short, long)]
    pub target: String,
    /// Seed segment as QUERY_START:TARGET_START:LENGTH[:FRAME] (0-based)
    #[arg(short, long = "seed", required = true)]
    pub seeds: Vec<String>,
    /// Scoring matrix: BLOSUM62 or NUCL
    #[arg(long, default_value = "BLOSUM62")]
    pub matrix: MatrixKind,
    /// Gap open cost (default: 11 for BLOSUM62, 5 for NUCL)
    #[arg(long)]
    pub gap_open: Option<Score>,
    /// Gap extend cost (default: 1 for BLOSUM62, 2 for NUCL)
    #[arg(long)]
    pub gap_extend: Option<Score>,
    /// Nucleotide match reward
    #[arg(long, default_value_t = 2)]
    pub reward: Score,
    /// Nucleotide mismatch penalty
    #[arg(long, default_value_t = -3, allow_hyphen_values = true)]
    pub penalty: Score,
    /// Band half-width of the extension
    #[arg(long, default_value_t = 32)]
    pub band: Loc,
    #[arg(long, default_value_t = 30)]
    pub x_drop: Score,
    /// Extension mode: score-only or traceback
    #[arg(long, default_value = "traceback")]
    pub mode: ExtensionMode,
    /// Score discount per letter between chained segments
    #[arg(long, default_value_t = 0.1)]
    pub space_penalty: f64,
    #[arg(long, default_value_t = 19)]
    pub min_chain_score: Score,
    /// Largest diagonal shift followed inside one chain
    #[arg(long, default_value_t = 2000)]
    pub max_shift: Loc,
    #[arg(long, default_value_t = 8)]
    pub range_cover: usize,
    /// Keep only this many best segments (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub max_nodes: usize,
    /// Total segment length kept, as a multiple of the query length (0 = off)
    #[arg(long, default_value_t = 2.0)]
    pub len_cap: f64,
    #[arg(long, default_value_t = 200)]
    pub min_nodes: usize,
    #[arg(long, default_value_t = 0.5)]
    pub stacked_hsp_ratio: f64,
    /// Do not merge adjacent chains
    #[arg(long, default_value_t = false)]
    pub no_merge: bool,
    /// Report chain-level alignments instead of refining them
    #[arg(long, default_value_t = false)]
    pub no_refine: bool,
    #[arg(short = 'n', long, default_value_t = 0)]
    pub num_threads: usize,
}

impl AlignArgs {
    pub fn scoring(&self) -> ScoringSpec {
        let mut spec = ScoringSpec::for_kind(self.matrix);
        if let Some(go) = self.gap_open {
            spec.gap_open = go;
        }
        if let Some(ge) = self.gap_extend {
            spec.gap_extend = ge;
        }
        if self.matrix == MatrixKind::Nucleotide {
            spec.reward = self.reward;
            spec.penalty = self.penalty;
        }
        spec
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            scoring: self.scoring(),
            chaining: ChainingConfig {
                space_penalty: self.space_penalty,
                min_chain_score: self.min_chain_score,
                max_shift: self.max_shift,
                range_cover: self.range_cover,
                max_nodes: self.max_nodes,
                len_cap: self.len_cap,
                min_nodes: self.min_nodes,
                stacked_hsp_ratio: self.stacked_hsp_ratio,
                ..ChainingConfig::default()
            },
            extension: ExtensionConfig {
                band: self.band,
                x_drop: self.x_drop,
                mode: self.mode,
            },
            merge_chains: !self.no_merge,
            refine: !self.no_refine,
        }
    }
}

/// Parse `QUERY_START:TARGET_START:LENGTH[:FRAME]`.
pub fn parse_seed(s: &str) -> Result<(Loc, Loc, Loc, i32), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!(
            "Seed must be QUERY_START:TARGET_START:LENGTH[:FRAME]: {}",
            s
        ));
    }
    let field = |k: usize, name: &str| {
        parts[k]
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("Invalid {} in seed {}: {}", name, s, parts[k]))
    };
    let q = field(0, "query start")?;
    let t = field(1, "target start")?;
    let len = field(2, "length")?;
    let frame = if parts.len() == 4 { field(3, "frame")? } else { 0 };
    if q < 0 || t < 0 || len <= 0 {
        return Err(format!(
            "Seed coordinates must be non-negative and length positive: {}",
            s
        ));
    }
    Ok((q, t, len, frame))
}
