//! Skin binding: bind once at rest, reconstruct every tick.
//!
//! Effectors are boundary simulation vertices that share a surface-face
//! edge with another boundary vertex. That edge gives the second axis of
//! the effector's local frame; the first is the vertex normal. Each render
//! vertex stores, for its K nearest effectors, its rest offset expressed in
//! the effector's frame and a normalized `1/d²` weight.

use morpho_math::{LocalFrame, Vec3};
use morpho_mesh::{Connectivity, RenderMesh};
use morpho_types::constants::{COLLINEARITY_THRESHOLD, EPSILON};
use morpho_types::{MorphoError, MorphoResult};
use serde::{Deserialize, Serialize};

use crate::kdtree::KdTree;

/// One (render vertex, effector) binding slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinInfluence {
    /// Simulation vertex driving the render vertex.
    pub effector: u32,
    /// Boundary neighbour across a surface edge, defining the frame's tangent.
    pub partner: u32,
    /// Rest offset from the effector, in the effector's local frame.
    pub local_offset: Vec3,
    /// Normalized weight.
    pub weight: f32,
}

/// Bind diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindReport {
    pub render_vertices: usize,
    /// Render vertices bound to fewer than K effectors.
    pub short_vertices: usize,
    /// Render vertices bound to none; they keep their rest position.
    pub unbound_vertices: usize,
}

/// Influences for every render vertex, CSR-style.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinBinding {
    influences: Vec<SkinInfluence>,
    /// `offsets[r]..offsets[r + 1]` are render vertex `r`'s influences.
    offsets: Vec<u32>,
    rest_positions: Vec<Vec3>,
}

impl SkinBinding {
    /// Bind `render` to the simulation mesh in its rest pose.
    ///
    /// `normals` are the rest vertex normals, `boundary` the per-vertex
    /// boundary flags. `k` is the number of effectors per render vertex.
    pub fn bind(
        render: &RenderMesh,
        positions: &[Vec3],
        normals: &[Vec3],
        boundary: &[bool],
        conn: &Connectivity,
        k: usize,
    ) -> MorphoResult<(Self, BindReport)> {
        render.validate()?;
        if k == 0 {
            return Err(MorphoError::Binding("weights per vertex must be >= 1".into()));
        }
        if positions.len() != boundary.len() || positions.len() != normals.len() {
            return Err(MorphoError::Binding(format!(
                "positions ({}), normals ({}), and boundary flags ({}) disagree",
                positions.len(),
                normals.len(),
                boundary.len()
            )));
        }

        let partners = effector_partners(positions, normals, boundary, conn);
        let tree = KdTree::build(
            partners
                .iter()
                .enumerate()
                .filter_map(|(v, p)| p.map(|_| (positions[v], v as u32))),
        );
        if tree.is_empty() {
            return Err(MorphoError::Binding(
                "no boundary vertex has a boundary neighbour across a surface edge".into(),
            ));
        }

        let mut report = BindReport {
            render_vertices: render.vertex_count(),
            ..Default::default()
        };
        let mut influences = Vec::with_capacity(render.vertex_count() * k);
        let mut offsets = Vec::with_capacity(render.vertex_count() + 1);
        offsets.push(0);

        for r in 0..render.vertex_count() {
            let rp = render.position(r);
            let nearest = tree.nearest(rp, k);
            if nearest.len() < k {
                report.short_vertices += 1;
            }
            if nearest.is_empty() {
                report.unbound_vertices += 1;
            }

            let first = influences.len();
            for (effector, dist_sq) in nearest {
                let e = effector as usize;
                let Some(partner) = partners[e] else {
                    continue;
                };
                let frame =
                    LocalFrame::from_normal_and_hint(normals[e], positions[partner as usize] - positions[e]);
                influences.push(SkinInfluence {
                    effector,
                    partner,
                    local_offset: frame.to_local(rp - positions[e]),
                    weight: 1.0 / dist_sq.max(EPSILON),
                });
            }

            let total: f32 = influences[first..].iter().map(|i| i.weight).sum();
            for inf in &mut influences[first..] {
                inf.weight /= total;
            }
            offsets.push(influences.len() as u32);
        }

        if report.short_vertices > 0 {
            tracing::warn!(
                short = report.short_vertices,
                effectors = tree.len(),
                wanted = k,
                "fewer effectors than requested for some render vertices"
            );
        }
        tracing::debug!(
            render_vertices = report.render_vertices,
            effectors = tree.len(),
            "skin bound"
        );

        Ok((
            Self {
                influences,
                offsets,
                rest_positions: render.positions(),
            },
            report,
        ))
    }

    #[inline]
    pub fn render_vertex_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Influences of render vertex `r`.
    #[inline]
    pub fn influences_of(&self, r: usize) -> &[SkinInfluence] {
        &self.influences[self.offsets[r] as usize..self.offsets[r + 1] as usize]
    }

    /// Reconstruct render positions from live simulation positions and
    /// normals. Unbound render vertices get their rest position.
    pub fn deform(&self, positions: &[Vec3], normals: &[Vec3], out: &mut [Vec3]) {
        for (r, slot) in out.iter_mut().enumerate().take(self.render_vertex_count()) {
            let influences = self.influences_of(r);
            if influences.is_empty() {
                *slot = self.rest_positions[r];
                continue;
            }
            *slot = influences
                .iter()
                .map(|inf| {
                    let e = inf.effector as usize;
                    let p = positions[e];
                    let frame =
                        LocalFrame::from_normal_and_hint(normals[e], positions[inf.partner as usize] - p);
                    inf.weight * (p + frame.to_world(inf.local_offset))
                })
                .sum();
        }
    }
}

/// For each boundary vertex, the boundary neighbour across a surface-face
/// edge least aligned with its rest normal. Edges within
/// `COLLINEARITY_THRESHOLD` of the normal cannot span a frame and are skipped.
fn effector_partners(
    positions: &[Vec3],
    normals: &[Vec3],
    boundary: &[bool],
    conn: &Connectivity,
) -> Vec<Option<u32>> {
    (0..boundary.len())
        .map(|v| {
            if !boundary[v] || v >= conn.vertex_count {
                return None;
            }
            let n = normals[v].try_normalize()?;
            conn.faces_of(v)
                .iter()
                .filter(|&&f| conn.is_surface_face(f as usize))
                .flat_map(|&f| conn.faces[f as usize])
                .filter(|&u| u as usize != v && boundary.get(u as usize).copied().unwrap_or(false))
                .filter_map(|u| {
                    let edge = (positions[u as usize] - positions[v]).try_normalize()?;
                    let alignment = n.dot(edge).abs();
                    (alignment <= COLLINEARITY_THRESHOLD).then_some((u, alignment))
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(u, _)| u)
        })
        .collect()
}
