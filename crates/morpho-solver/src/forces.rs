//! Force model: geometry refresh and per-vertex force accumulation.
//!
//! Owns the connectivity and the current/rest geometry. Each tick
//! [`ForceModel::refresh_geometry`] must run before
//! [`ForceModel::accumulate_forces`].
//!
//! Forces per vertex:
//! - volume preservation over incident tets, along the opposing face normal
//! - distance preservation over incident edges, plus velocity damping
//! - area preservation over incident faces, along the height over the
//!   opposite edge
//! - gravity, floor penalty, constraint forces, external forces

use morpho_math::geometry::{height_over_edge, triangle_area_normal};
use morpho_math::Vec3;
use morpho_mesh::Connectivity;

use crate::config::SimulationConfig;
use crate::geometry::{GeometryState, RefreshOutcome};
use crate::handles::ExternalForce;
use crate::heterogeneous::{HeterogeneousConstants, SpringFamily};
use crate::state::{KinematicBuffer, VertexAttributes};

/// Connectivity plus the geometry the forces are computed from.
#[derive(Debug, Clone)]
pub struct ForceModel {
    conn: Connectivity,
    geometry: GeometryState,
}

impl ForceModel {
    pub fn new(conn: Connectivity) -> Self {
        let geometry = GeometryState::new(&conn);
        Self { conn, geometry }
    }

    #[inline]
    pub fn connectivity(&self) -> &Connectivity {
        &self.conn
    }

    #[inline]
    pub fn geometry(&self) -> &GeometryState {
        &self.geometry
    }

    /// Replace the geometry wholesale (used by reset).
    pub fn restore_geometry(&mut self, geometry: GeometryState) {
        self.geometry = geometry;
    }

    /// Recompute volumes, face area-normals, and edge lengths.
    pub fn refresh_geometry(&mut self, positions: &[Vec3], config: &SimulationConfig) -> RefreshOutcome {
        let outcome = self.geometry.refresh(
            &self.conn,
            positions,
            config.bad_volume_threshold,
            config.max_bad_tets,
        );
        if !outcome.ok {
            tracing::warn!(
                bad_tets = outcome.bad_tets,
                max = config.max_bad_tets,
                "too many bad tets, geometry refresh aborted"
            );
        }
        outcome
    }

    /// First pass at initialize: refresh without the bad-tet limit, capture
    /// rest values, then fix face orientations.
    pub fn capture_rest(&mut self, positions: &[Vec3], config: &SimulationConfig) {
        self.geometry
            .refresh(&self.conn, positions, config.bad_volume_threshold, usize::MAX);
        self.geometry.capture_rest();

        let normals: Vec<Vec3> = self
            .conn
            .faces
            .iter()
            .enumerate()
            .map(|(f, &[a, b, c])| {
                if f == 0 {
                    Vec3::ZERO
                } else {
                    triangle_area_normal(positions[a as usize], positions[b as usize], positions[c as usize])
                }
            })
            .collect();
        self.conn.orient(&normals, positions);
    }

    /// Recompute unit outward vertex normals.
    pub fn update_normals(&self, normals: &mut [Vec3]) {
        self.geometry.vertex_normals(&self.conn, normals);
    }

    /// Unit outward vertex normals of an arbitrary pose. The cached
    /// geometry is left untouched.
    pub fn pose_normals(&self, positions: &[Vec3], normals: &mut [Vec3]) {
        let conn = &self.conn;
        for (v, normal) in normals.iter_mut().enumerate() {
            let sum: Vec3 = conn
                .faces_of(v)
                .iter()
                .map(|&f| f as usize)
                .filter(|&f| conn.face_outward[f] != 0.0)
                .map(|f| {
                    let [a, b, c] = conn.faces[f];
                    conn.face_outward[f]
                        * triangle_area_normal(positions[a as usize], positions[b as usize], positions[c as usize])
                })
                .sum();
            *normal = sum.normalize_or_zero();
        }
    }

    /// Add every force acting on each vertex into `buf.force`.
    ///
    /// Returns the number of out-of-range indices skipped in `external`.
    pub fn accumulate_forces(
        &self,
        buf: &mut KinematicBuffer,
        attrs: &VertexAttributes,
        config: &SimulationConfig,
        hetero: &HeterogeneousConstants,
        external: &[ExternalForce],
    ) -> usize {
        let conn = &self.conn;
        let geo = &self.geometry;
        let gravity = config.gravity_vec();
        let up = config.up_axis();
        let world_offset = Vec3::from(config.world_offset);

        for v in 0..buf.len() {
            let p = buf.position[v];
            let mut force = Vec3::ZERO;

            // Volume
            for inc in conn.tets_of(v) {
                let t = inc.tet as usize;
                let k = hetero.max_over(SpringFamily::Volume, config.k_volume, &conn.tets[t]);
                let dv = geo.tet_volume[t].abs() - geo.rest_volume[t].abs();
                let n = geo.face_area_normal[inc.face()].normalize_or_zero();
                force -= k * dv * inc.toward_sign() * n;
            }

            // Distance
            for &e in conn.edges_of(v) {
                let e = e as usize;
                let [a, b] = conn.edges[e];
                let other = conn.other_endpoint(e, v as u32);
                let k = hetero.max_over(SpringFamily::Distance, config.k_distance, &[a, b]);
                let dir = (p - buf.position[other as usize]).normalize_or_zero();
                force += k * (geo.rest_edge_length[e] - geo.edge_length[e]) * dir;
            }

            // Damping
            let k_damp = hetero.vertex(SpringFamily::Damping, config.k_damping, v);
            force -= k_damp * buf.velocity[v];

            // Area
            for &f in conn.faces_of(v) {
                let f = f as usize;
                let face = conn.faces[f];
                let mut others = face.iter().filter(|&&u| u as usize != v);
                let (Some(&a), Some(&b)) = (others.next(), others.next()) else {
                    continue;
                };
                let k = hetero.max_over(SpringFamily::Area, config.k_area, &face);
                let height =
                    height_over_edge(p, buf.position[a as usize], buf.position[b as usize]).normalize_or_zero();
                force += k * (geo.rest_face_area[f] - geo.face_area(f)) * height;
            }

            if config.gravity_enabled {
                force += if config.gravity_is_acceleration {
                    attrs.mass[v] * gravity
                } else {
                    gravity
                };
            }

            if config.floor_enabled {
                let depth = config.floor_height - (p + world_offset).dot(up);
                if depth > 0.0 {
                    force += config.k_floor * depth * up;
                }
            }

            if attrs.force_locks[v] > 0 {
                force += attrs.constraint_force[v];
            }

            buf.force[v] += force;
        }

        let n = buf.len();
        let mut skipped = 0;
        for ext in external {
            skipped += ext.vertices.for_each(n, |v| buf.force[v] += ext.force);
        }
        if skipped > 0 {
            tracing::warn!(skipped, "external forces reference out-of-range vertices");
        }
        skipped
    }
}
