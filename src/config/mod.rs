//! Engine configuration.

pub mod scoring;

pub use scoring::ScoringSpec;

use crate::common::{Loc, Score};
use crate::error::{AlignError, Result};

/// Chain builder configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainingConfig {
    /// Score discount per letter of distance between chained segments
    pub space_penalty: f64,
    /// Minimum relative score of a chain end, and minimum chain score
    pub min_chain_score: Score,
    /// Largest diagonal shift followed within one chain
    pub max_shift: Loc,
    /// Nodes covered by more than this many better nodes are pruned
    pub range_cover: usize,
    /// Keep only the best-scoring nodes (0 = unlimited)
    pub max_nodes: usize,
    /// Total node length kept, as a multiple of the query length (0 = off)
    pub len_cap: f64,
    /// Nodes always kept by the length cap
    pub min_nodes: usize,
    /// Overlapping chains are tolerated above this score ratio
    pub stacked_hsp_ratio: f64,
    /// Splice search window around a junction
    pub link_padding: Loc,
    /// Overhang that triggers a reverse link
    pub reverse_link_min_overhang: Loc,
}

impl Default for ChainingConfig {
    fn default() -> Self {
        Self {
            space_penalty: 0.1,
            min_chain_score: 19,
            max_shift: 2000,
            range_cover: 8,
            max_nodes: 0,
            len_cap: 2.0,
            min_nodes: 200,
            stacked_hsp_ratio: 0.5,
            link_padding: 10,
            reverse_link_min_overhang: 10,
        }
    }
}

/// DP backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtensionMode {
    /// Two alternating columns, score and end coordinates only
    ScoreOnly,
    /// Every column kept, full edit script
    #[default]
    Traceback,
}

impl std::str::FromStr for ExtensionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "score" | "score-only" | "score_only" => Ok(ExtensionMode::ScoreOnly),
            "traceback" | "full" => Ok(ExtensionMode::Traceback),
            _ => Err(format!(
                "Unknown extension mode: {}. Use 'score-only' or 'traceback'",
                s
            )),
        }
    }
}

/// Banded extension configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionConfig {
    /// Band half-width around the anchor diagonal
    pub band: Loc,
    /// X-drop for gapped extension
    pub x_drop: Score,
    pub mode: ExtensionMode,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            band: 32,
            x_drop: 30,
            mode: ExtensionMode::Traceback,
        }
    }
}

/// Everything one (query, target) task needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    pub scoring: ScoringSpec,
    pub chaining: ChainingConfig,
    pub extension: ExtensionConfig,
    /// Merge adjacent chains after backtrace
    pub merge_chains: bool,
    /// Refine chains into exact alignments
    pub refine: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringSpec::default(),
            chaining: ChainingConfig::default(),
            extension: ExtensionConfig::default(),
            merge_chains: true,
            refine: true,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(AlignError::InvalidConfig(msg));
        let s = &self.scoring;
        if s.gap_open < 0 || s.gap_extend < 0 {
            return invalid(format!(
                "gap costs must be non-negative (open {}, extend {})",
                s.gap_open, s.gap_extend
            ));
        }
        let c = &self.chaining;
        if !c.space_penalty.is_finite() || c.space_penalty < 0.0 {
            return invalid(format!("space penalty {} out of range", c.space_penalty));
        }
        if !c.len_cap.is_finite() || c.len_cap < 0.0 {
            return invalid(format!("length cap {} out of range", c.len_cap));
        }
        if !(c.stacked_hsp_ratio > 0.0 && c.stacked_hsp_ratio <= 1.0) {
            return invalid(format!(
                "stacked HSP ratio {} not in (0, 1]",
                c.stacked_hsp_ratio
            ));
        }
        if c.max_shift < 0 || c.link_padding < 0 {
            return invalid("max shift and link padding must be non-negative".to_string());
        }
        let e = &self.extension;
        if e.band < 0 {
            return invalid(format!("band {} is negative", e.band));
        }
        if e.x_drop <= 0 {
            return invalid(format!("x-drop {} must be positive", e.x_drop));
        }
        Ok(())
    }
}
