//! Post-processing of chains and refined alignments.

pub mod chain;
pub mod filter;

pub use chain::merge_chains;
pub use filter::drop_enveloped;
