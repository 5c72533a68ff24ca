//! Exact alignment: banded extension, traceback and the packed transcript.

pub mod dp_matrix;
pub mod result;
pub mod sw_banded;
pub mod traceback;
pub mod transcript;

pub use dp_matrix::{DpBackend, ScoreOnlyBuffer, TracebackBuffer};
pub use result::Hsp;
pub use sw_banded::{
    BandedExtender, BiasCorrection, Direction, Extension, ExtensionScratch, NoCorrection,
    QueryBiasCorrection,
};
pub use transcript::{CombinedOperation, EditOp, PackedOperation, PackedTranscript};
