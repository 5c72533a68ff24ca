pub mod common;
pub mod error;
pub mod utils;

pub mod align;
pub mod chaining;
pub mod config;
pub mod post;

pub mod args;
pub mod diagnostics;
pub mod pipeline;

pub use error::{AlignError, Result};
