//! Engine run metrics.
//!
//! The intended usage is:
//!
//! - `Matcher::run` / `Matcher::find` for normal operation.
//! - `Matcher::run_with_metrics` for profiling and for inspecting how much of
//!   the automaton a document exercised.
//!
//! Counters are cheap integer increments in the simulation loop; timings are
//! taken once per phase.

use crate::api::Match;
use std::time::Duration;

/// Counters and timings for one simulation over one document.
#[derive(Debug, Default, Clone)]
pub struct SimulationMetrics {
    /// Elapsed time for the whole simulation.
    pub duration: Duration,
    /// Fragments left in the start set after the trigger scan.
    pub active_fragments: usize,
    /// Fragments registered in total.
    pub total_fragments: usize,
    /// Start offsets simulated.
    pub starts: usize,
    /// Token steps taken across all starts.
    pub steps: usize,
    /// States added to an active set (after epsilon closure dedup).
    pub states_visited: usize,
    /// Accept hits, including duplicates collapsed afterwards.
    pub accepts: usize,
}

#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    /// Total elapsed time for `run_with_metrics`.
    pub total: Duration,
    pub simulation: SimulationMetrics,
    /// Time spent in `on_match` callbacks.
    pub callbacks: Duration,
}

/// Matches bundled with timing information.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub matches: Vec<Match>,
    pub metrics: RunMetrics,
}
