//! Diagnostic counters for the chaining and extension pipeline
//!
//! Tracks where seed segments are dropped and how much DP work is done.
//! Enabled via the DIAGCHAIN_DIAGNOSTICS environment variable; components
//! take an `Option<&DiagnosticCounters>` and skip counting when it is `None`.

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

/// Check if diagnostics are enabled via environment variable
pub fn diagnostics_enabled() -> bool {
    std::env::var("DIAGCHAIN_DIAGNOSTICS")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

#[derive(Debug, Default)]
pub struct DiagnosticCounters {
    // Task level
    pub tasks: AtomicUsize,
    pub task_failures: AtomicUsize,
    // Graph construction
    pub seed_segments: AtomicUsize,
    pub nodes_loaded: AtomicUsize,
    pub nodes_capped: AtomicUsize, // dropped by max_nodes / len_cap
    pub nodes_pruned: AtomicUsize, // dropped by range cover
    pub edges_created: AtomicUsize,
    // Backtrace and merge
    pub chains_emitted: AtomicUsize,
    pub chains_merged: AtomicUsize,
    // Extension
    pub extensions: AtomicUsize,
    pub dp_cells: AtomicUsize,
    pub traceback_failures: AtomicUsize,
    pub hsps_reported: AtomicUsize,
}

#[inline]
pub(crate) fn bump(counter: &AtomicUsize, n: usize) {
    counter.fetch_add(n, AtomicOrdering::Relaxed);
}

impl DiagnosticCounters {
    fn get(counter: &AtomicUsize) -> usize {
        counter.load(AtomicOrdering::Relaxed)
    }

    /// Print a summary of all diagnostic counters
    pub fn print_summary(&self) {
        eprintln!("\n=== Chaining Pipeline Diagnostics ===");
        eprintln!("Tasks:");
        eprintln!("  Tasks run:                  {}", Self::get(&self.tasks));
        eprintln!(
            "  Tasks failed:               {}",
            Self::get(&self.task_failures)
        );
        eprintln!("Diagonal Graph:");
        eprintln!(
            "  Seed segments:              {}",
            Self::get(&self.seed_segments)
        );
        eprintln!(
            "  Nodes after load:           {}",
            Self::get(&self.nodes_loaded)
        );
        eprintln!(
            "  Nodes dropped (caps):       {}",
            Self::get(&self.nodes_capped)
        );
        eprintln!(
            "  Nodes dropped (pruning):    {}",
            Self::get(&self.nodes_pruned)
        );
        eprintln!(
            "  Edges created:              {}",
            Self::get(&self.edges_created)
        );
        eprintln!("Chains:");
        eprintln!(
            "  Chains emitted:             {}",
            Self::get(&self.chains_emitted)
        );
        eprintln!(
            "  Chain merges:               {}",
            Self::get(&self.chains_merged)
        );
        eprintln!("Banded Extension:");
        let extensions = Self::get(&self.extensions);
        let cells = Self::get(&self.dp_cells);
        eprintln!("  Extensions:                 {}", extensions);
        eprintln!("  DP cells computed:          {}", cells);
        if extensions > 0 {
            eprintln!(
                "    Average cells/extension:  {:.1}",
                cells as f64 / extensions as f64
            );
        }
        let tb_failures = Self::get(&self.traceback_failures);
        if tb_failures > 0 {
            eprintln!("  Traceback failures:         {}", tb_failures);
            eprintln!("  WARNING: traceback failures indicate inconsistent DP scores");
        }
        eprintln!(
            "  HSPs reported:              {}",
            Self::get(&self.hsps_reported)
        );
    }
}
