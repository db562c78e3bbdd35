//! # morpho-solver
//!
//! Deformable tetrahedral soft-body simulation.
//!
//! Per tick: [`ConstraintScheduler::advance`] → [`ForceModel::refresh_geometry`]
//! → [`ForceModel::accumulate_forces`] → [`Integrator::step`] → (optional) skin update.
//!
//! ## Key Types
//!
//! - [`SoftBody`] — The engine and its control surface
//! - [`SoftBodyBuilder`] — Collects configuration before `initialize()`
//! - [`SimulationConfig`] — Spring constants, time step, gravity, floor
//! - [`VertexBuffers`] — Current/previous kinematic buffers, swapped each tick
//! - [`ConstraintScheduler`] — Time-windowed force/position constraints
//! - [`HeterogeneousConstants`] — Per-vertex spring-constant overrides
//! - [`SceneNode`] — Leaf soft body or proxy to a child node

pub mod builder;
pub mod config;
pub mod constraints;
pub mod engine;
pub mod forces;
pub mod geometry;
pub mod handles;
pub mod heterogeneous;
pub mod integrator;
pub mod mass;
pub mod node;
pub mod report;
pub mod state;

pub use builder::{PendingConfig, SoftBodyBuilder};
pub use config::{MassStrategy, SimulationConfig};
pub use constraints::{
    AdvanceReport, Constraint, ConstraintPayload, ConstraintScheduler, ConstraintState, VertexSelector,
};
pub use engine::SoftBody;
pub use forces::ForceModel;
pub use geometry::{GeometryState, RefreshOutcome};
pub use handles::{ExternalForce, ExternalForceHandle, KinematicSnapshot, ResetHandle, SharedKinematics};
pub use heterogeneous::{HeterogeneousAssignment, HeterogeneousConstants, SpringFamily};
pub use integrator::{ConvergenceStats, Integrator, VerletIntegrator};
pub use node::SceneNode;
pub use report::TickReport;
pub use state::{KinematicBuffer, VertexAttributes, VertexBuffers};
