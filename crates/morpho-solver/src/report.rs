//! Per-tick diagnostics.
//!
//! Returned from every `tick()` instead of being written to global state.

use serde::{Deserialize, Serialize};

use crate::integrator::ConvergenceStats;

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick counter after this tick (unchanged when the tick failed).
    pub tick: u64,
    /// Simulation time the tick ran at.
    pub sim_time: f32,
    /// False when the bad-tet check aborted the tick before any vertex moved.
    pub success: bool,
    /// Bad tets found by the geometry refresh.
    pub bad_tets: usize,
    /// Motion statistics. Zero when the tick failed.
    pub stats: ConvergenceStats,
    pub constraints_activated: usize,
    pub constraints_ended: usize,
    /// Out-of-range vertex indices skipped in constraints and external forces.
    pub skipped_indices: usize,
    /// A pending reset was applied before the tick.
    pub reset_applied: bool,
    /// Wall-clock time for this tick (seconds).
    pub wall_time: f64,
}
