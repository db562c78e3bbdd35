//! Two-phase construction of a [`SoftBody`].
//!
//! Everything that has to wait for the final vertex count (heterogeneous
//! assignments, constraints, initial external forces) is collected in a
//! [`PendingConfig`] and applied exactly once inside
//! [`SoftBodyBuilder::initialize`]. After that the same operations go
//! straight to the engine.

use morpho_math::Vec3;
use morpho_mesh::{Connectivity, TetMesh};
use morpho_types::{MorphoError, MorphoResult};

use crate::config::SimulationConfig;
use crate::constraints::{Constraint, ConstraintScheduler};
use crate::engine::{RestState, SoftBody};
use crate::forces::ForceModel;
use crate::handles::{ExternalForce, ExternalForceHandle, ResetHandle, SharedKinematics};
use crate::heterogeneous::{HeterogeneousAssignment, HeterogeneousConstants, SpringFamily};
use crate::integrator::{Integrator, VerletIntegrator};
use crate::mass::assign_masses;
use crate::state::{VertexAttributes, VertexBuffers};

/// Settings collected before the body exists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingConfig {
    pub constraints: Vec<Constraint>,
    pub heterogeneous: Vec<HeterogeneousAssignment>,
    /// Families to consult once the arrays exist.
    pub enabled_families: Vec<SpringFamily>,
    pub external_forces: Vec<ExternalForce>,
}

impl PendingConfig {
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
            && self.heterogeneous.is_empty()
            && self.enabled_families.is_empty()
            && self.external_forces.is_empty()
    }
}

/// Builder for [`SoftBody`].
///
/// ```
/// use morpho_math::Vec3;
/// use morpho_mesh::generators::single_tet;
/// use morpho_solver::{SimulationConfig, SoftBodyBuilder};
///
/// let mesh = single_tet(Vec3::new(0.0, 0.5, 0.0), 1.0);
/// let mut body = SoftBodyBuilder::new(SimulationConfig::default())
///     .initialize(&mesh, None)
///     .unwrap();
/// assert!(body.tick().success);
/// ```
pub struct SoftBodyBuilder {
    config: SimulationConfig,
    pending: PendingConfig,
    integrator: Option<Box<dyn Integrator>>,
}

impl SoftBodyBuilder {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            pending: PendingConfig::default(),
            integrator: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn pending(&self) -> &PendingConfig {
        &self.pending
    }

    /// Replace all pending settings.
    pub fn with_pending(mut self, pending: PendingConfig) -> Self {
        self.pending = pending;
        self
    }

    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.pending.constraints.push(constraint);
        self
    }

    pub fn heterogeneous(mut self, assignment: HeterogeneousAssignment) -> Self {
        self.pending.heterogeneous.push(assignment);
        self
    }

    pub fn enable_heterogeneous(mut self, family: SpringFamily) -> Self {
        if !self.pending.enabled_families.contains(&family) {
            self.pending.enabled_families.push(family);
        }
        self
    }

    pub fn external_force(mut self, force: ExternalForce) -> Self {
        self.pending.external_forces.push(force);
        self
    }

    /// Use a different integrator. Defaults to [`VerletIntegrator`].
    pub fn integrator(mut self, integrator: Box<dyn Integrator>) -> Self {
        self.integrator = Some(integrator);
        self
    }

    /// Build the body from `mesh`.
    ///
    /// With a `previous` instance, its gravity/floor toggles and shared
    /// handles are always carried over; its heterogeneous arrays and
    /// constraints are carried over only when the vertex count matches.
    pub fn initialize(self, mesh: &TetMesh, previous: Option<&SoftBody>) -> MorphoResult<SoftBody> {
        let Self {
            mut config,
            pending,
            integrator,
        } = self;

        if let Some(prev) = previous {
            config.gravity_enabled = prev.config().gravity_enabled;
            config.floor_enabled = prev.config().floor_enabled;
        }
        config.validate()?;
        mesh.validate()?;

        let positions: Vec<Vec3> = mesh.positions();
        let (conn, conn_report) = Connectivity::build(&mesh.tets, &positions)?;
        if conn.tet_count() == 0 {
            return Err(MorphoError::InvalidMesh(format!(
                "All {} tets are degenerate",
                conn_report.input_tets
            )));
        }

        let mut forces = ForceModel::new(conn);
        forces.capture_rest(&positions, &config);

        let n = positions.len();
        let boundary = mesh
            .boundary_flags()
            .unwrap_or_else(|| forces.connectivity().surface_vertices());
        let mut attrs = VertexAttributes::new(n, boundary);
        forces.update_normals(&mut attrs.normal);

        assign_masses(
            config.mass_strategy,
            config.mass_constant,
            &forces.connectivity().tets,
            &forces.geometry().rest_volume,
            &mut attrs.mass,
        );

        let mut hetero = HeterogeneousConstants::new(n);
        let mut scheduler = ConstraintScheduler::new();
        if let Some(prev) = previous {
            if prev.vertex_count() == n {
                hetero.carry_from(prev.heterogeneous());
                for c in prev.constraints().constraints() {
                    scheduler.add(c.clone())?;
                }
            } else {
                tracing::info!(
                    previous = prev.vertex_count(),
                    current = n,
                    "vertex count changed, not carrying constraints or heterogeneous constants"
                );
            }
        }

        for &family in &pending.enabled_families {
            hetero.enable(family, family.scalar(&config));
        }
        for a in &pending.heterogeneous {
            hetero.assign(a.family, &a.vertices, a.value, a.family.scalar(&config));
        }
        for c in pending.constraints {
            scheduler.add(c)?;
        }

        let (external, reset_handle, kinematics) = match previous {
            Some(prev) => (
                prev.external_forces().clone(),
                prev.reset_handle().clone(),
                prev.shared_kinematics().clone(),
            ),
            None => (
                ExternalForceHandle::new(),
                ResetHandle::new(),
                SharedKinematics::new(),
            ),
        };
        if !pending.external_forces.is_empty() {
            external.set(pending.external_forces);
        }
        // A reset requested against the previous instance is moot now.
        reset_handle.take();

        let buffers = VertexBuffers::at_rest(&positions);
        let rest = RestState {
            buffers: buffers.clone(),
            attrs: attrs.clone(),
            geometry: forces.geometry().clone(),
        };

        tracing::info!(
            vertices = n,
            tets = forces.connectivity().tet_count(),
            faces = forces.connectivity().face_count(),
            edges = forces.connectivity().edge_count(),
            dropped = conn_report.dropped_tets,
            constraints = scheduler.len(),
            "soft body initialized"
        );

        let body = SoftBody {
            config,
            forces,
            buffers,
            attrs,
            hetero,
            scheduler,
            integrator: integrator.unwrap_or_else(|| Box::new(VerletIntegrator::new())),
            external,
            reset_handle,
            kinematics,
            rest,
            connectivity_report: conn_report,
            time: 0.0,
            tick: 0,
            skin: None,
        };
        body.publish();
        Ok(body)
    }
}
