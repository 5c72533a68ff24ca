//! Structured failure signals raised by the chaining and extension engine.

use thiserror::Error;

use crate::common::{Loc, Score};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AlignError {
    /// The edge arena cannot index any more edges. Reduce the node caps.
    #[error("too many edges in diagonal graph (limit {limit})")]
    TooManyEdges { limit: usize },

    /// No DP transition explains the score of a cell during traceback.
    #[error("traceback error at query {query_pos}, target {target_pos} (score {score})")]
    TracebackInconsistency {
        query_pos: Loc,
        target_pos: Loc,
        score: Score,
    },

    /// The segment runs past a sequence end or across a delimiter.
    #[error("seed segment {index} lies outside the sequences")]
    SegmentOutOfBounds { index: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AlignError>;
