//! Simulation configuration.
//!
//! Parameters that control the force model and integrator: time step,
//! spring constants, gravity, floor contact, mass assignment, and the
//! bad-tet tolerance of the geometry refresh.

use morpho_math::Vec3;
use morpho_types::constants;
use morpho_types::{MorphoError, MorphoResult};
use serde::{Deserialize, Serialize};

/// How per-vertex mass is derived from `mass_constant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassStrategy {
    /// Every vertex weighs `mass_constant`.
    FixedVertexMass,
    /// `mass_constant` is a density; each tet spreads `|V|·ρ/4` to its corners.
    FixedTetDensity,
    /// `mass_constant` is the total mass, spread like `FixedTetDensity`.
    FixedTotalMass,
}

/// Configuration for a soft body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed time step (seconds).
    pub dt: f32,

    /// Volume-preservation stiffness.
    pub k_volume: f32,
    /// Area-preservation stiffness.
    pub k_area: f32,
    /// Distance-preservation (edge spring) stiffness.
    pub k_distance: f32,
    /// Velocity damping coefficient.
    pub k_damping: f32,

    /// Gravity vector [gx, gy, gz].
    pub gravity: [f32; 3],
    /// Whether gravity is applied.
    pub gravity_enabled: bool,
    /// When true, `gravity` is an acceleration and each vertex receives
    /// `mass · gravity`; otherwise it is applied as a raw force.
    pub gravity_is_acceleration: bool,

    /// Whether the floor penalty is applied.
    pub floor_enabled: bool,
    /// Floor height along the up axis (opposite gravity), in world space.
    pub floor_height: f32,
    /// Floor penalty stiffness.
    pub k_floor: f32,
    /// Object-to-world translation, used for the floor test only.
    pub world_offset: [f32; 3],

    /// Mass assignment strategy.
    pub mass_strategy: MassStrategy,
    /// Vertex mass, density, or total mass depending on `mass_strategy`.
    pub mass_constant: f32,

    /// Tets with |volume| below this, or whose volume changed sign since
    /// rest, count as bad.
    pub bad_volume_threshold: f32,
    /// Bad tets tolerated before a tick reports failure.
    pub max_bad_tets: usize,

    /// Effectors bound to each render vertex.
    pub skin_weights_per_vertex: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            dt: constants::DEFAULT_DT,
            k_volume: constants::DEFAULT_K_VOLUME,
            k_area: constants::DEFAULT_K_AREA,
            k_distance: constants::DEFAULT_K_DISTANCE,
            k_damping: constants::DEFAULT_K_DAMPING,
            gravity: [0.0, -constants::GRAVITY, 0.0],
            gravity_enabled: true,
            gravity_is_acceleration: true,
            floor_enabled: true,
            floor_height: 0.0,
            k_floor: constants::DEFAULT_K_FLOOR,
            world_offset: [0.0; 3],
            mass_strategy: MassStrategy::FixedVertexMass,
            mass_constant: constants::DEFAULT_MASS_CONSTANT,
            bad_volume_threshold: constants::BAD_TET_VOLUME_THRESHOLD,
            max_bad_tets: constants::DEFAULT_MAX_BAD_TETS,
            skin_weights_per_vertex: constants::DEFAULT_SKIN_WEIGHTS,
        }
    }
}

impl SimulationConfig {
    /// A softer, jigglier body (lower stiffness, lighter damping).
    pub fn soft() -> Self {
        Self {
            k_volume: 20.0,
            k_area: 20.0,
            k_distance: 150.0,
            k_damping: 2.0,
            ..Default::default()
        }
    }

    /// A stiff body. Needs the smaller step to stay stable.
    pub fn stiff() -> Self {
        Self {
            dt: 2.5e-4,
            k_volume: 400.0,
            k_area: 400.0,
            k_distance: 4000.0,
            k_damping: 10.0,
            k_floor: 20000.0,
            ..Default::default()
        }
    }

    /// Gravity as a vector.
    #[inline]
    pub fn gravity_vec(&self) -> Vec3 {
        Vec3::from(self.gravity)
    }

    /// Unit up axis for the floor test: opposite gravity, `+Y` when
    /// gravity is zero.
    #[inline]
    pub fn up_axis(&self) -> Vec3 {
        (-self.gravity_vec()).try_normalize().unwrap_or(Vec3::Y)
    }

    /// Checks that values are finite and physically meaningful.
    pub fn validate(&self) -> MorphoResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(MorphoError::InvalidConfig(
                "Timestep dt must be positive".into(),
            ));
        }

        let constants = [
            ("k_volume", self.k_volume),
            ("k_area", self.k_area),
            ("k_distance", self.k_distance),
            ("k_damping", self.k_damping),
            ("k_floor", self.k_floor),
            ("mass_constant", self.mass_constant),
            ("bad_volume_threshold", self.bad_volume_threshold),
        ];
        for (name, value) in constants {
            if !value.is_finite() || value < 0.0 {
                return Err(MorphoError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }

        if self.mass_constant == 0.0 {
            return Err(MorphoError::InvalidConfig(
                "mass_constant must be positive".into(),
            ));
        }

        if !self.floor_height.is_finite()
            || self.gravity.iter().any(|g| !g.is_finite())
            || self.world_offset.iter().any(|o| !o.is_finite())
        {
            return Err(MorphoError::InvalidConfig(
                "gravity, floor height, and world offset must be finite".into(),
            ));
        }

        if self.skin_weights_per_vertex == 0 {
            return Err(MorphoError::InvalidConfig(
                "skin_weights_per_vertex must be >= 1".into(),
            ));
        }

        Ok(())
    }
}
