//! Physical constants and simulation defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.81;

/// Default simulation timestep (seconds).
///
/// The integrator is explicit, so the step has to stay well below
/// `2 / sqrt(k / m)` for the stiffest spring in the mesh.
pub const DEFAULT_DT: f32 = 1.0e-3;

/// Default volume-preservation stiffness.
pub const DEFAULT_K_VOLUME: f32 = 50.0;

/// Default area-preservation stiffness.
pub const DEFAULT_K_AREA: f32 = 50.0;

/// Default distance-preservation (edge spring) stiffness.
pub const DEFAULT_K_DISTANCE: f32 = 500.0;

/// Default velocity damping coefficient.
pub const DEFAULT_K_DAMPING: f32 = 5.0;

/// Default floor penalty stiffness.
pub const DEFAULT_K_FLOOR: f32 = 5000.0;

/// Default mass constant (kg per vertex under `FixedVertexMass`).
pub const DEFAULT_MASS_CONSTANT: f32 = 1.0;

/// Faces whose edges have a normalized dot product above this are
/// considered collinear, and the owning tet degenerate.
pub const COLLINEARITY_THRESHOLD: f32 = 0.9995;

/// Tets with |volume| below this count as "bad" during a tick.
pub const BAD_TET_VOLUME_THRESHOLD: f32 = 1.0e-9;

/// Default number of bad tets tolerated before a tick reports failure.
pub const DEFAULT_MAX_BAD_TETS: usize = 0;

/// Default number of skinning effectors bound to each render vertex.
pub const DEFAULT_SKIN_WEIGHTS: usize = 4;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f32 = 1.0e-7;

/// Magnitude above which convergence statistics are considered runaway.
pub const VERY_BIG: f32 = 1.0e6;
