//! Integration tests for diagchain
//!
//! Tests are organized by component:
//! - `transcript` - packed edit script encoding
//! - `chaining` - diagonal graph and chain builder
//! - `extension` - banded X-drop extension and traceback
//! - `pipeline` - per-task driver, batches and diagnostics

pub mod extension;
pub mod helpers;
pub mod pipeline;
pub mod transcript;
