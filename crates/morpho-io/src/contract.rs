//! Simulation input/output contract types.
//!
//! These types define the I/O boundary of the morpho engine. They are
//! serializable for CLI configuration and file exchange.

use std::fs;
use std::path::Path;

use morpho_math::Vec3;
use morpho_mesh::{RenderMesh, TetMesh};
use morpho_solver::{
    Constraint, ConvergenceStats, ExternalForce, HeterogeneousAssignment, PendingConfig, SimulationConfig,
    SoftBody, SoftBodyBuilder, SpringFamily,
};
use morpho_types::{MorphoError, MorphoResult};
use serde::{Deserialize, Serialize};

/// Complete input for a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    /// The tetrahedral mesh to simulate.
    pub mesh: TetMesh,

    /// Optional render mesh skinned to the simulation mesh.
    #[serde(default)]
    pub render: Option<RenderMesh>,

    /// Time-windowed force and position constraints.
    #[serde(default)]
    pub constraints: Vec<Constraint>,

    /// Per-vertex spring constant overrides.
    #[serde(default)]
    pub heterogeneous: Vec<HeterogeneousAssignment>,

    /// Spring families whose overrides are consulted.
    #[serde(default)]
    pub enabled_families: Vec<SpringFamily>,

    /// External forces present from the first tick.
    #[serde(default)]
    pub external_forces: Vec<ExternalForce>,

    /// Solver configuration.
    #[serde(default)]
    pub config: SimulationConfig,

    /// Total simulated time in seconds.
    pub duration: f32,
}

impl SimulationInput {
    /// Input with no constraints or overrides.
    pub fn new(mesh: TetMesh, config: SimulationConfig, duration: f32) -> Self {
        Self {
            mesh,
            render: None,
            constraints: Vec::new(),
            heterogeneous: Vec::new(),
            enabled_families: Vec::new(),
            external_forces: Vec::new(),
            config,
            duration,
        }
    }

    /// Number of ticks needed to cover `duration`.
    pub fn tick_count(&self) -> u64 {
        if self.config.dt <= 0.0 || !self.duration.is_finite() || self.duration <= 0.0 {
            return 0;
        }
        // f32 steps rarely divide the duration exactly
        let ticks = self.duration as f64 / self.config.dt as f64;
        (ticks - 1.0e-6).ceil().max(0.0) as u64
    }

    /// Everything that waits for the final vertex count.
    pub fn pending(&self) -> PendingConfig {
        PendingConfig {
            constraints: self.constraints.clone(),
            heterogeneous: self.heterogeneous.clone(),
            enabled_families: self.enabled_families.clone(),
            external_forces: self.external_forces.clone(),
        }
    }

    /// Builder carrying this input's configuration and pending settings.
    pub fn builder(&self) -> SoftBodyBuilder {
        SoftBodyBuilder::new(self.config.clone()).with_pending(self.pending())
    }

    /// Initialize a body from this input and bind the render mesh, if any.
    pub fn instantiate(&self, previous: Option<&SoftBody>) -> MorphoResult<SoftBody> {
        let mut body = self.builder().initialize(&self.mesh, previous)?;
        if let Some(render) = &self.render {
            let report = body.bind_render_mesh(render.clone())?;
            tracing::info!(
                render_vertices = report.render_vertices,
                short = report.short_vertices,
                "render mesh bound"
            );
        }
        Ok(body)
    }

    pub fn from_json_str(json: &str) -> MorphoResult<Self> {
        serde_json::from_str(json).map_err(|e| MorphoError::Serialization(format!("input: {e}")))
    }

    pub fn to_json(&self) -> MorphoResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| MorphoError::Serialization(format!("input: {e}")))
    }

    /// Reads a JSON input file.
    pub fn load(path: &Path) -> MorphoResult<Self> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Writes this input as pretty JSON.
    pub fn save(&self, path: &Path) -> MorphoResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Output from a completed simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// Final simulation vertex positions.
    pub positions: Vec<Vec3>,
    /// Final simulation vertex normals.
    pub normals: Vec<Vec3>,
    /// Final skinned render positions, when a render mesh was bound.
    pub render_positions: Option<Vec<Vec3>>,
    /// Run-wide metrics.
    pub metrics: SimulationMetrics,
}

impl SimulationOutput {
    /// Captures the final state of `body`.
    pub fn capture(body: &SoftBody, metrics: SimulationMetrics) -> Self {
        Self {
            positions: body.positions().to_vec(),
            normals: body.normals().to_vec(),
            render_positions: body.render_mesh().map(|m| m.positions()),
            metrics,
        }
    }

    pub fn to_json(&self) -> MorphoResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| MorphoError::Serialization(format!("output: {e}")))
    }

    pub fn save(&self, path: &Path) -> MorphoResult<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Aggregate metrics from a simulation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationMetrics {
    /// Total wall-clock time (seconds).
    pub wall_time_seconds: f64,
    /// Successful ticks.
    pub tick_count: u64,
    /// Ticks aborted by the bad-tet check.
    pub failed_ticks: u64,
    /// Simulated time reached (seconds).
    pub sim_time: f32,
    /// Kinetic energy after the last tick.
    pub final_kinetic_energy: f64,
    /// Motion statistics of the last successful tick.
    pub final_stats: ConvergenceStats,
}
