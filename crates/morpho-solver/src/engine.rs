//! The soft-body engine and its control surface.
//!
//! Built by [`crate::SoftBodyBuilder`]. One thread calls [`SoftBody::tick`];
//! other threads interact through the shared handles.

use std::fmt;
use std::time::Instant;

use morpho_math::Vec3;
use morpho_mesh::{Connectivity, ConnectivityReport, RenderMesh};
use morpho_skin::{BindReport, SkinBinding};
use morpho_types::MorphoResult;

use crate::config::SimulationConfig;
use crate::constraints::{Constraint, ConstraintScheduler, VertexSelector};
use crate::forces::ForceModel;
use crate::geometry::GeometryState;
use crate::handles::{ExternalForce, ExternalForceHandle, ResetHandle, SharedKinematics};
use crate::heterogeneous::{HeterogeneousConstants, SpringFamily};
use crate::integrator::Integrator;
use crate::report::TickReport;
use crate::state::{VertexAttributes, VertexBuffers};

/// Everything `reset()` restores, captured at the end of initialize.
#[derive(Debug, Clone)]
pub(crate) struct RestState {
    pub(crate) buffers: VertexBuffers,
    pub(crate) attrs: VertexAttributes,
    pub(crate) geometry: GeometryState,
}

/// A bound render mesh and its deformed copy.
#[derive(Debug, Clone)]
pub(crate) struct SkinState {
    binding: SkinBinding,
    mesh: RenderMesh,
    scratch: Vec<Vec3>,
    /// Vertex normals of the pose being skinned.
    normals: Vec<Vec3>,
}

/// A deformable tetrahedral body.
pub struct SoftBody {
    pub(crate) config: SimulationConfig,
    pub(crate) forces: ForceModel,
    pub(crate) buffers: VertexBuffers,
    pub(crate) attrs: VertexAttributes,
    pub(crate) hetero: HeterogeneousConstants,
    pub(crate) scheduler: ConstraintScheduler,
    pub(crate) integrator: Box<dyn Integrator>,
    pub(crate) external: ExternalForceHandle,
    pub(crate) reset_handle: ResetHandle,
    pub(crate) kinematics: SharedKinematics,
    pub(crate) rest: RestState,
    pub(crate) connectivity_report: ConnectivityReport,
    pub(crate) time: f32,
    pub(crate) tick: u64,
    pub(crate) skin: Option<SkinState>,
}

impl fmt::Debug for SoftBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftBody")
            .field("vertices", &self.vertex_count())
            .field("tets", &self.forces.connectivity().tet_count())
            .field("integrator", &self.integrator.name())
            .field("time", &self.time)
            .field("tick", &self.tick)
            .field("skinned", &self.skin.is_some())
            .finish_non_exhaustive()
    }
}

impl SoftBody {
    // ─── Ticking ──────────────────────────────────────────────

    /// Advance the simulation by one time step.
    ///
    /// Order: pending reset → constraints → geometry refresh → normals →
    /// forces → integration. When too many tets are bad the tick stops after
    /// the geometry refresh; no vertex moves and time does not advance.
    pub fn tick(&mut self) -> TickReport {
        let start = Instant::now();
        let mut report = TickReport::default();

        if self.reset_handle.take() {
            tracing::info!(time = self.time, "applying requested reset");
            self.reset();
            report.reset_applied = true;
        }
        report.tick = self.tick;
        report.sim_time = self.time;

        let advance = self
            .scheduler
            .advance(self.time, &mut self.attrs, &self.buffers.current().position);
        report.constraints_activated = advance.activated;
        report.constraints_ended = advance.ended;
        report.skipped_indices = advance.skipped_indices;

        let outcome = self
            .forces
            .refresh_geometry(&self.buffers.current().position, &self.config);
        report.bad_tets = outcome.bad_tets;
        if !outcome.ok {
            report.wall_time = start.elapsed().as_secs_f64();
            return report;
        }

        self.forces.update_normals(&mut self.attrs.normal);

        let skipped = self.external.with(|external| {
            self.forces.accumulate_forces(
                self.buffers.current_mut(),
                &self.attrs,
                &self.config,
                &self.hetero,
                external,
            )
        });
        report.skipped_indices += skipped;

        report.stats = self.integrator.step(&mut self.buffers, &self.attrs, self.config.dt);

        self.time += self.config.dt;
        self.tick += 1;
        self.publish();

        report.tick = self.tick;
        report.success = true;
        report.wall_time = start.elapsed().as_secs_f64();
        report
    }

    /// Restore the state captured at the end of initialize.
    ///
    /// Constraints stay registered but return to pending; the skin, if
    /// bound, is rebuilt from the rest pose.
    pub fn reset(&mut self) {
        self.buffers = self.rest.buffers.clone();
        self.attrs = self.rest.attrs.clone();
        self.forces.restore_geometry(self.rest.geometry.clone());
        self.scheduler.reset(&mut self.attrs);
        self.time = 0.0;
        self.tick = 0;
        self.publish();
        if self.skin.is_some() {
            self.update_skin();
        }
        tracing::debug!("soft body reset");
    }

    pub(crate) fn publish(&self) {
        self.kinematics.publish(
            self.tick,
            self.time,
            &self.buffers.current().position,
            &self.attrs.normal,
        );
    }

    // ─── Control surface ──────────────────────────────────────

    /// Replace the external force list.
    pub fn apply_external_force(&self, forces: Vec<ExternalForce>) {
        self.external.set(forces);
    }

    /// Add a constraint; it is considered from the next tick on.
    pub fn add_constraint(&mut self, constraint: Constraint) -> MorphoResult<()> {
        self.scheduler.add(constraint)
    }

    /// Release every active constraint and drop all constraints.
    pub fn clear_constraints(&mut self) {
        self.scheduler.clear(&mut self.attrs);
    }

    /// Toggle whether `family` uses the per-vertex array.
    pub fn enable_heterogeneous(&mut self, family: SpringFamily, enabled: bool) {
        if enabled {
            self.hetero.enable(family, family.scalar(&self.config));
        } else {
            self.hetero.disable(family);
        }
    }

    /// Set `family`'s per-vertex value on the selected vertices. Returns the
    /// number of out-of-range indices skipped.
    pub fn set_heterogeneous_value(&mut self, family: SpringFamily, vertices: &VertexSelector, value: f32) -> usize {
        let scalar = family.scalar(&self.config);
        self.hetero.assign(family, vertices, value, scalar)
    }

    pub fn enable_gravity(&mut self, enabled: bool) {
        self.config.gravity_enabled = enabled;
    }

    pub fn enable_floor(&mut self, enabled: bool) {
        self.config.floor_enabled = enabled;
    }

    /// Bind a render mesh to the boundary vertices in their rest pose, then
    /// deform it to the current pose.
    ///
    /// On failure any previous binding is kept.
    pub fn bind_render_mesh(&mut self, mesh: RenderMesh) -> MorphoResult<BindReport> {
        let bound = SkinBinding::bind(
            &mesh,
            &self.rest.buffers.current().position,
            &self.rest.attrs.normal,
            &self.attrs.boundary,
            self.forces.connectivity(),
            self.config.skin_weights_per_vertex,
        );
        let (binding, report) = match bound {
            Ok(bound) => bound,
            Err(e) => {
                tracing::warn!(error = %e, "render mesh binding failed");
                return Err(e);
            }
        };
        let scratch = vec![Vec3::ZERO; mesh.vertex_count()];
        self.skin = Some(SkinState {
            binding,
            mesh,
            scratch,
            normals: vec![Vec3::ZERO; self.vertex_count()],
        });
        self.update_skin();
        Ok(report)
    }

    /// Reconstruct the bound render mesh from the current pose. Returns
    /// false, with a warning, when nothing is bound.
    ///
    /// Frames use normals recomputed from the current positions, not the
    /// pre-step normals cached by the last tick.
    pub fn update_skin(&mut self) -> bool {
        let Some(skin) = self.skin.as_mut() else {
            tracing::warn!("update_skin called without a bound render mesh");
            return false;
        };
        let positions = &self.buffers.current().position;
        self.forces.pose_normals(positions, &mut skin.normals);
        skin.binding.deform(positions, &skin.normals, &mut skin.scratch);
        skin.mesh.set_positions(&skin.scratch);
        true
    }

    // ─── Accessors ────────────────────────────────────────────

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.attrs.vertex_count()
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn sim_time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.buffers.current().position
    }

    pub fn velocities(&self) -> &[Vec3] {
        &self.buffers.current().velocity
    }

    /// Force accumulator of the current buffer. Zero between ticks; holds
    /// the last tick's forces in the previous buffer.
    pub fn forces(&self) -> &[Vec3] {
        &self.buffers.current().force
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.attrs.normal
    }

    pub fn masses(&self) -> &[f32] {
        &self.attrs.mass
    }

    pub fn boundary(&self) -> &[bool] {
        &self.attrs.boundary
    }

    pub fn buffers(&self) -> &VertexBuffers {
        &self.buffers
    }

    pub fn attributes(&self) -> &VertexAttributes {
        &self.attrs
    }

    pub fn connectivity(&self) -> &Connectivity {
        self.forces.connectivity()
    }

    pub fn connectivity_report(&self) -> ConnectivityReport {
        self.connectivity_report
    }

    pub fn geometry(&self) -> &GeometryState {
        self.forces.geometry()
    }

    pub fn heterogeneous(&self) -> &HeterogeneousConstants {
        &self.hetero
    }

    pub fn constraints(&self) -> &ConstraintScheduler {
        &self.scheduler
    }

    pub fn integrator_name(&self) -> &str {
        self.integrator.name()
    }

    pub fn external_forces(&self) -> &ExternalForceHandle {
        &self.external
    }

    pub fn reset_handle(&self) -> &ResetHandle {
        &self.reset_handle
    }

    pub fn shared_kinematics(&self) -> &SharedKinematics {
        &self.kinematics
    }

    /// The deformed render mesh, when one is bound.
    pub fn render_mesh(&self) -> Option<&RenderMesh> {
        self.skin.as_ref().map(|s| &s.mesh)
    }

    pub fn skin_binding(&self) -> Option<&SkinBinding> {
        self.skin.as_ref().map(|s| &s.binding)
    }

    /// Kinetic energy from the reporting velocities.
    pub fn kinetic_energy(&self) -> f64 {
        self.buffers.kinetic_energy(&self.attrs.mass)
    }
}
