//! Simulation event types.
//!
//! Structured events emitted around each tick. Events are plain value
//! types, so this crate does not depend on the solver.

use serde::{Deserialize, Serialize};

/// A simulation event tagged with the tick it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Tick counter (0-indexed).
    pub tick: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Tick started.
    TickBegin {
        /// Simulation time the tick runs at (seconds).
        sim_time: f64,
    },

    /// Tick finished.
    TickEnd {
        /// Wall-clock time for the tick (seconds).
        wall_time: f64,
        /// Whether the tick completed.
        success: bool,
    },

    /// Per-tick motion statistics.
    Convergence {
        max_displacement: f32,
        mean_displacement: f32,
        max_velocity_delta: f32,
        mean_velocity_delta: f32,
    },

    /// The geometry refresh found too many bad tets.
    GeometryFailure {
        bad_tets: u32,
    },

    /// Constraints changed state during the tick.
    ConstraintTransition {
        activated: u32,
        ended: u32,
    },

    /// Kinetic energy after the tick.
    Energy {
        kinetic: f64,
    },

    /// The body was reset to its initial state.
    Reset,

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    pub fn new(tick: u64, kind: EventKind) -> Self {
        Self { tick, kind }
    }

    /// True for events that indicate a problem.
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            EventKind::GeometryFailure { .. } | EventKind::TickEnd { success: false, .. }
        )
    }
}
