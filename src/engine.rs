//! Pattern compilation and matching engine.
//!
//! ## How the parts work together
//!
//! ```text
//! rules (key + patterns) ──┐
//!                          │  CompiledRules::new          (compiled_rules.rs)
//!                          └──────────────┬──────────────
//!                                         │  one arena, one fragment per pattern
//! document ── TriggerInfo::scan ──────────┼─ admit fragments whose literals occur
//!             (trigger.rs)                │
//!                                         v
//!                               Parser::run (parser.rs)
//!                                 - re-seed entries at every start offset
//!                                 - epsilon closure + token steps
//!                                 - record every accepting window
//!                                 - dedup via MatchKey (dedup.rs)
//!                                         │
//!                                         v
//!                              Vec<MatchKey> sorted by (start, end)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `compiled_rules.rs`: Thompson fragment construction into a shared arena.
//! - `trigger.rs`: scans the document for literal values so fragments that
//!   cannot match are skipped.
//! - `parser.rs`: NFA simulation from every start offset.
//! - `dedup.rs`: collapses identical `(rule, start, end)` windows.
//! - `metrics.rs`: optional timing and counters for a run.
//!
//! The registry (`matcher.rs`) owns rule keys and callbacks and rebuilds the
//! `CompiledRules` whenever rules change.

#[path = "engine/compiled_rules.rs"]
mod compiled_rules;
#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/parser.rs"]
mod parser;
#[path = "engine/trigger.rs"]
mod trigger;

pub use compiled_rules::CompiledRules;
pub(crate) use dedup::MatchKey;
pub use metrics::{RunMetrics, RunResult, SimulationMetrics};
pub use parser::Parser;
