//! Simulation and render mesh containers with SoA (Structure of Arrays) layout.
//!
//! Both meshes store each coordinate channel contiguously:
//! - `pos_x: [x0, x1, x2, ...]`
//! - `pos_y: [y0, y1, y2, ...]`
//! - `pos_z: [z0, z1, z2, ...]`
//!
//! These are the inputs handed over by a mesh provider; the solver copies
//! positions into its own kinematic buffers at `initialize()`.

use morpho_math::Vec3;
use morpho_types::{MorphoError, MorphoResult};
use serde::{Deserialize, Serialize};

/// A tetrahedral mesh as supplied by a mesh provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TetMesh {
    /// X coordinates of all vertices.
    pub pos_x: Vec<f32>,
    /// Y coordinates of all vertices.
    pub pos_y: Vec<f32>,
    /// Z coordinates of all vertices.
    pub pos_z: Vec<f32>,

    /// Tet indices, stored flat: `[t0v0, t0v1, t0v2, t0v3, t1v0, ...]`.
    pub tets: Vec<u32>,

    /// Per-vertex boundary markers, `marker_width` entries per vertex.
    /// Empty means "derive the boundary from the surface faces".
    #[serde(default)]
    pub boundary_markers: Vec<i32>,

    /// Number of marker entries per vertex.
    #[serde(default = "default_marker_width")]
    pub marker_width: usize,
}

fn default_marker_width() -> usize {
    1
}

impl TetMesh {
    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, tet_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(vertex_capacity),
            pos_y: Vec::with_capacity(vertex_capacity),
            pos_z: Vec::with_capacity(vertex_capacity),
            tets: Vec::with_capacity(tet_capacity * 4),
            boundary_markers: Vec::new(),
            marker_width: 1,
        }
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos_x.len()
    }

    /// Returns the number of tets in the raw index buffer (before any
    /// degenerate tets are dropped).
    #[inline]
    pub fn tet_count(&self) -> usize {
        self.tets.len() / 4
    }

    /// Returns the position of vertex `i`.
    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    /// Collects all positions into an AoS vector.
    pub fn positions(&self) -> Vec<Vec3> {
        (0..self.vertex_count()).map(|i| self.position(i)).collect()
    }

    /// Returns the four vertex indices of tet `t`.
    #[inline]
    pub fn tet(&self, t: usize) -> [u32; 4] {
        let base = t * 4;
        [
            self.tets[base],
            self.tets[base + 1],
            self.tets[base + 2],
            self.tets[base + 3],
        ]
    }

    /// Appends a vertex and returns its index.
    pub fn push_vertex(&mut self, p: Vec3) -> u32 {
        let idx = self.pos_x.len() as u32;
        self.pos_x.push(p.x);
        self.pos_y.push(p.y);
        self.pos_z.push(p.z);
        idx
    }

    /// Appends a tet.
    pub fn push_tet(&mut self, tet: [u32; 4]) {
        self.tets.extend_from_slice(&tet);
    }

    /// Translates every vertex by `offset`.
    pub fn translate(&mut self, offset: Vec3) {
        for i in 0..self.vertex_count() {
            self.pos_x[i] += offset.x;
            self.pos_y[i] += offset.y;
            self.pos_z[i] += offset.z;
        }
    }

    /// Per-vertex boundary flags from the marker array.
    ///
    /// A vertex is boundary when any of its `marker_width` markers is
    /// non-zero. Returns `None` when no markers were supplied.
    pub fn boundary_flags(&self) -> Option<Vec<bool>> {
        if self.boundary_markers.is_empty() || self.marker_width == 0 {
            return None;
        }
        Some(
            self.boundary_markers
                .chunks(self.marker_width)
                .map(|markers| markers.iter().any(|&m| m != 0))
                .collect(),
        )
    }

    /// Validates mesh integrity.
    ///
    /// Checks:
    /// - All SoA arrays have the same length
    /// - The tet buffer is a multiple of 4 and indices are in range
    /// - Boundary markers, if present, cover every vertex
    ///
    /// Degenerate tets are *not* an error here; the connectivity builder
    /// drops them.
    pub fn validate(&self) -> MorphoResult<()> {
        let n = self.pos_x.len();

        if self.pos_y.len() != n || self.pos_z.len() != n {
            return Err(MorphoError::InvalidMesh(
                "Position arrays have inconsistent lengths".into(),
            ));
        }

        if self.tets.len() % 4 != 0 {
            return Err(MorphoError::InvalidMesh(
                "Tet index count is not divisible by 4".into(),
            ));
        }

        for (i, &idx) in self.tets.iter().enumerate() {
            if idx as usize >= n {
                return Err(MorphoError::InvalidMesh(format!(
                    "Tet index {} at position {} is out of range (vertex count: {})",
                    idx, i, n
                )));
            }
        }

        if !self.boundary_markers.is_empty() {
            if self.marker_width == 0 {
                return Err(MorphoError::InvalidMesh(
                    "Boundary markers supplied with marker width 0".into(),
                ));
            }
            if self.boundary_markers.len() != n * self.marker_width {
                return Err(MorphoError::InvalidMesh(format!(
                    "Boundary marker count ({}) != vertex count ({}) × marker width ({})",
                    self.boundary_markers.len(),
                    n,
                    self.marker_width
                )));
            }
        }

        Ok(())
    }

    /// Constructs a mesh from interleaved AoS position data
    /// `[x0, y0, z0, x1, y1, z1, ...]` and a flat tet buffer.
    pub fn from_interleaved(positions: &[f32], tets: &[u32]) -> MorphoResult<Self> {
        if positions.len() % 3 != 0 {
            return Err(MorphoError::InvalidMesh(
                "Interleaved positions length not divisible by 3".into(),
            ));
        }

        let n = positions.len() / 3;
        let mut mesh = Self::with_capacity(n, tets.len() / 4);
        for p in positions.chunks_exact(3) {
            mesh.pos_x.push(p[0]);
            mesh.pos_y.push(p[1]);
            mesh.pos_z.push(p[2]);
        }
        mesh.tets = tets.to_vec();

        mesh.validate()?;
        Ok(mesh)
    }
}

/// A triangle mesh bound to the simulation by skinning.
///
/// Only positions and topology are carried; shading data belongs to the
/// renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderMesh {
    pub pos_x: Vec<f32>,
    pub pos_y: Vec<f32>,
    pub pos_z: Vec<f32>,

    /// Triangle indices — each triangle is `[v0, v1, v2]`, stored flat.
    pub indices: Vec<u32>,
}

impl RenderMesh {
    /// Creates an empty mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            pos_x: Vec::with_capacity(vertex_capacity),
            pos_y: Vec::with_capacity(vertex_capacity),
            pos_z: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(triangle_capacity * 3),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos_x.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn position(&self, i: usize) -> Vec3 {
        Vec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
    }

    /// Collects all positions into an AoS vector.
    pub fn positions(&self) -> Vec<Vec3> {
        (0..self.vertex_count()).map(|i| self.position(i)).collect()
    }

    /// Overwrites vertex positions from an AoS slice of the same length.
    pub fn set_positions(&mut self, positions: &[Vec3]) {
        for (i, p) in positions.iter().enumerate().take(self.vertex_count()) {
            self.pos_x[i] = p.x;
            self.pos_y[i] = p.y;
            self.pos_z[i] = p.z;
        }
    }

    /// Appends a vertex and returns its index.
    pub fn push_vertex(&mut self, p: Vec3) -> u32 {
        let idx = self.pos_x.len() as u32;
        self.pos_x.push(p.x);
        self.pos_y.push(p.y);
        self.pos_z.push(p.z);
        idx
    }

    /// Validates SoA consistency and index ranges.
    pub fn validate(&self) -> MorphoResult<()> {
        let n = self.pos_x.len();
        if self.pos_y.len() != n || self.pos_z.len() != n {
            return Err(MorphoError::InvalidMesh(
                "Render mesh position arrays have inconsistent lengths".into(),
            ));
        }
        if self.indices.len() % 3 != 0 {
            return Err(MorphoError::InvalidMesh(
                "Render mesh index count is not divisible by 3".into(),
            ));
        }
        if let Some(&bad) = self.indices.iter().find(|&&idx| idx as usize >= n) {
            return Err(MorphoError::InvalidMesh(format!(
                "Render mesh index {} is out of range (vertex count: {})",
                bad, n
            )));
        }
        Ok(())
    }
}
