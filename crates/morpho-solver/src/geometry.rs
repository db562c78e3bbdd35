//! Per-tick geometry refresh.
//!
//! Recomputes tet volumes, face area-normals, and edge lengths from the
//! current positions. The rest values are captured once from the first pass
//! and are what the preservation forces pull toward.

use morpho_math::geometry::{tet_signed_volume, triangle_area_normal};
use morpho_math::Vec3;
use morpho_mesh::Connectivity;

/// Outcome of a geometry refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Tets below the volume threshold or inverted relative to rest.
    pub bad_tets: usize,
    /// False when `bad_tets` exceeded the allowed maximum. Faces and edges
    /// are left untouched in that case.
    pub ok: bool,
}

/// Current and rest geometry of every tet, face, and edge.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryState {
    /// Signed tet volume.
    pub tet_volume: Vec<f32>,
    /// Signed rest volume.
    pub rest_volume: Vec<f32>,
    /// Face normal scaled by face area. Slot 0 stays zero.
    pub face_area_normal: Vec<Vec3>,
    /// Rest face area.
    pub rest_face_area: Vec<f32>,
    /// Edge length.
    pub edge_length: Vec<f32>,
    /// Rest edge length.
    pub rest_edge_length: Vec<f32>,
}

impl GeometryState {
    /// Zeroed geometry sized to `conn`.
    pub fn new(conn: &Connectivity) -> Self {
        Self {
            tet_volume: vec![0.0; conn.tet_count()],
            rest_volume: vec![0.0; conn.tet_count()],
            face_area_normal: vec![Vec3::ZERO; conn.faces.len()],
            rest_face_area: vec![0.0; conn.faces.len()],
            edge_length: vec![0.0; conn.edge_count()],
            rest_edge_length: vec![0.0; conn.edge_count()],
        }
    }

    /// Recompute all current geometry.
    ///
    /// Volumes come first. If more than `max_bad` tets are bad the refresh
    /// stops there and reports failure.
    pub fn refresh(
        &mut self,
        conn: &Connectivity,
        positions: &[Vec3],
        bad_threshold: f32,
        max_bad: usize,
    ) -> RefreshOutcome {
        let mut bad_tets = 0;
        for (t, &[a, b, c, d]) in conn.tets.iter().enumerate() {
            let v = tet_signed_volume(
                positions[a as usize],
                positions[b as usize],
                positions[c as usize],
                positions[d as usize],
            );
            self.tet_volume[t] = v;

            let rest = self.rest_volume[t];
            let inverted = rest != 0.0 && v.signum() != rest.signum();
            if v.abs() < bad_threshold || inverted {
                bad_tets += 1;
            }
        }

        if bad_tets > max_bad {
            return RefreshOutcome { bad_tets, ok: false };
        }

        for (f, &[a, b, c]) in conn.faces.iter().enumerate().skip(1) {
            self.face_area_normal[f] = triangle_area_normal(
                positions[a as usize],
                positions[b as usize],
                positions[c as usize],
            );
        }

        for (e, &[a, b]) in conn.edges.iter().enumerate() {
            self.edge_length[e] = positions[a as usize].distance(positions[b as usize]);
        }

        RefreshOutcome { bad_tets, ok: true }
    }

    /// Copy the current geometry into the rest arrays.
    pub fn capture_rest(&mut self) {
        self.rest_volume.copy_from_slice(&self.tet_volume);
        for (rest, n) in self.rest_face_area.iter_mut().zip(&self.face_area_normal) {
            *rest = n.length();
        }
        self.rest_edge_length.copy_from_slice(&self.edge_length);
    }

    /// Current area of face `f`.
    #[inline]
    pub fn face_area(&self, f: usize) -> f32 {
        self.face_area_normal[f].length()
    }

    /// Unit outward vertex normals from the incident surface faces.
    ///
    /// Requires an oriented connectivity. Interior vertices get zero.
    pub fn vertex_normals(&self, conn: &Connectivity, normals: &mut [Vec3]) {
        for (v, normal) in normals.iter_mut().enumerate() {
            let sum: Vec3 = conn
                .faces_of(v)
                .iter()
                .map(|&f| conn.face_outward[f as usize] * self.face_area_normal[f as usize])
                .sum();
            *normal = sum.normalize_or_zero();
        }
    }

    /// Σ |rest volume|.
    pub fn total_rest_volume(&self) -> f32 {
        self.rest_volume.iter().map(|v| v.abs()).sum()
    }
}
