//! Connectivity extraction from a raw tet list.
//!
//! Turns a flat tet index buffer into deduplicated face and edge tables plus
//! per-vertex adjacency, all stored as flat arrays. Per-vertex adjacency is
//! CSR-style: each vertex owns an `(offset, count)` range into a global
//! incidence array, so per-tick traversal never chases pointers.
//!
//! Built once at initialize. The only post-build mutation is
//! [`Connectivity::orient`], which fixes the sign of every opposing-face
//! entry after the first face-normal pass.

use std::collections::HashMap;

use morpho_math::geometry::is_collinear_triangle;
use morpho_math::Vec3;
use morpho_types::constants::COLLINEARITY_THRESHOLD;
use morpho_types::{MorphoError, MorphoResult};

/// Vertex pairs of the 6 tet edges, by local corner.
const TET_EDGES: [(usize, usize); 6] = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];

/// One (vertex, containing tet) adjacency entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TetIncidence {
    /// Index of the containing tet.
    pub tet: u32,
    /// Local corner (0..4) the vertex occupies in that tet.
    pub corner: u8,
    /// Signed index of the face opposite the vertex. Positive when the
    /// face's area-normal points toward the vertex, negative otherwise.
    /// The sign is meaningful only after [`Connectivity::orient`].
    pub opposing_face: i32,
}

impl TetIncidence {
    /// Unsigned face index.
    #[inline]
    pub fn face(&self) -> usize {
        self.opposing_face.unsigned_abs() as usize
    }

    /// `+1.0` if the opposing face normal points toward the vertex, else `-1.0`.
    #[inline]
    pub fn toward_sign(&self) -> f32 {
        if self.opposing_face > 0 {
            1.0
        } else {
            -1.0
        }
    }
}

/// Per-vertex `(start, count)` ranges into the three incidence arrays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdjacencyRange {
    pub tet_start: u32,
    pub tet_count: u32,
    pub face_start: u32,
    pub face_count: u32,
    pub edge_start: u32,
    pub edge_count: u32,
}

/// Diagnostics from a connectivity build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectivityReport {
    /// Tets in the input buffer.
    pub input_tets: usize,
    /// Tets dropped as degenerate.
    pub dropped_tets: usize,
    /// (vertex, tet) entries skipped because the opposing face was missing.
    pub unlinked_entries: usize,
}

/// Deduplicated topology and CSR adjacency of a tet mesh.
#[derive(Debug, Clone)]
pub struct Connectivity {
    /// Number of vertices the adjacency covers.
    pub vertex_count: usize,

    /// Surviving (non-degenerate) tets, in input order.
    pub tets: Vec<[u32; 4]>,

    /// Canonical faces `v0 < v1 < v2`. Slot 0 is the `(0, 0, 0)` sentinel.
    pub faces: Vec<[u32; 3]>,

    /// Canonical edges `v0 < v1`.
    pub edges: Vec<[u32; 2]>,

    /// Number of tets sharing each face. Surface faces have exactly 1.
    pub face_tet_count: Vec<u32>,

    /// Orientation of each surface face: `+1.0` when its area-normal points
    /// out of the mesh, `-1.0` when it points in, `0.0` for interior faces
    /// and the sentinel. Filled by [`Connectivity::orient`].
    pub face_outward: Vec<f32>,

    /// Flat (vertex, tet) incidences, grouped by vertex.
    pub vertex_tets: Vec<TetIncidence>,
    /// Flat (vertex, face) incidences, grouped by vertex.
    pub vertex_faces: Vec<u32>,
    /// Flat (vertex, edge) incidences, grouped by vertex.
    pub vertex_edges: Vec<u32>,

    /// Per-vertex ranges into the incidence arrays.
    pub ranges: Vec<AdjacencyRange>,

    oriented: bool,
}

impl Connectivity {
    /// Build connectivity from a flat tet buffer and vertex positions.
    ///
    /// Degenerate tets (a repeated corner index, or any face with two
    /// near-collinear edges) are dropped and counted, never fatal.
    /// Out-of-range indices are a hard error; run [`crate::TetMesh::validate`]
    /// first to get a clearer diagnostic.
    pub fn build(tets: &[u32], positions: &[Vec3]) -> MorphoResult<(Self, ConnectivityReport)> {
        if tets.len() % 4 != 0 {
            return Err(MorphoError::InvalidMesh(
                "Tet index count is not divisible by 4".into(),
            ));
        }
        let vertex_count = positions.len();
        let mut report = ConnectivityReport {
            input_tets: tets.len() / 4,
            ..Default::default()
        };

        // Filter degenerate tets
        let mut surviving: Vec<[u32; 4]> = Vec::with_capacity(report.input_tets);
        for (t, chunk) in tets.chunks_exact(4).enumerate() {
            let tet = [chunk[0], chunk[1], chunk[2], chunk[3]];
            if let Some(&bad) = tet.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(MorphoError::InvalidMesh(format!(
                    "Tet {} references vertex {} (vertex count: {})",
                    t, bad, vertex_count
                )));
            }
            if is_degenerate(tet, positions) {
                tracing::debug!(tet = t, corners = ?tet, "dropping degenerate tet");
                report.dropped_tets += 1;
                continue;
            }
            surviving.push(tet);
        }
        if report.dropped_tets > 0 {
            tracing::warn!(
                dropped = report.dropped_tets,
                total = report.input_tets,
                "dropped degenerate tets"
            );
        }

        // Deduplicate faces and edges. Indices follow first appearance,
        // so the tables are deterministic regardless of hash order.
        let mut face_map: HashMap<[u32; 3], u32> = HashMap::new();
        let mut faces: Vec<[u32; 3]> = vec![[0, 0, 0]];
        let mut face_tet_count: Vec<u32> = vec![0];
        let mut edge_map: HashMap<[u32; 2], u32> = HashMap::new();
        let mut edges: Vec<[u32; 2]> = Vec::new();

        for tet in &surviving {
            for corner in 0..4 {
                let key = opposite_face(*tet, corner);
                let idx = *face_map.entry(key).or_insert_with(|| {
                    faces.push(key);
                    face_tet_count.push(0);
                    (faces.len() - 1) as u32
                });
                face_tet_count[idx as usize] += 1;
            }
            for (a, b) in TET_EDGES {
                let key = canonical_edge(tet[a], tet[b]);
                edge_map.entry(key).or_insert_with(|| {
                    edges.push(key);
                    (edges.len() - 1) as u32
                });
            }
        }

        // (vertex, tet) incidences with their opposing faces
        let mut tet_pairs: Vec<(u32, TetIncidence)> = Vec::with_capacity(surviving.len() * 4);
        for (t, tet) in surviving.iter().enumerate() {
            for corner in 0..4 {
                let key = opposite_face(*tet, corner);
                match face_map.get(&key) {
                    Some(&face) => tet_pairs.push((
                        tet[corner],
                        TetIncidence {
                            tet: t as u32,
                            corner: corner as u8,
                            opposing_face: face as i32,
                        },
                    )),
                    None => {
                        tracing::warn!(tet = t, vertex = tet[corner], "opposing face not found, skipping");
                        report.unlinked_entries += 1;
                    }
                }
            }
        }

        let mut face_pairs: Vec<(u32, u32)> = Vec::with_capacity(faces.len() * 3);
        for (f, face) in faces.iter().enumerate().skip(1) {
            for &v in face {
                face_pairs.push((v, f as u32));
            }
        }

        let mut edge_pairs: Vec<(u32, u32)> = Vec::with_capacity(edges.len() * 2);
        for (e, edge) in edges.iter().enumerate() {
            for &v in edge {
                edge_pairs.push((v, e as u32));
            }
        }

        // Flatten to CSR. Stable sorts keep per-vertex lists in build order.
        tet_pairs.sort_by_key(|&(v, _)| v);
        face_pairs.sort_by_key(|&(v, _)| v);
        edge_pairs.sort_by_key(|&(v, _)| v);

        let tet_ranges = csr_ranges(tet_pairs.iter().map(|&(v, _)| v), vertex_count);
        let face_ranges = csr_ranges(face_pairs.iter().map(|&(v, _)| v), vertex_count);
        let edge_ranges = csr_ranges(edge_pairs.iter().map(|&(v, _)| v), vertex_count);

        let ranges = (0..vertex_count)
            .map(|v| AdjacencyRange {
                tet_start: tet_ranges[v].0,
                tet_count: tet_ranges[v].1,
                face_start: face_ranges[v].0,
                face_count: face_ranges[v].1,
                edge_start: edge_ranges[v].0,
                edge_count: edge_ranges[v].1,
            })
            .collect();

        let face_outward = vec![0.0; faces.len()];

        Ok((
            Self {
                vertex_count,
                tets: surviving,
                faces,
                edges,
                face_tet_count,
                face_outward,
                vertex_tets: tet_pairs.into_iter().map(|(_, inc)| inc).collect(),
                vertex_faces: face_pairs.into_iter().map(|(_, f)| f).collect(),
                vertex_edges: edge_pairs.into_iter().map(|(_, e)| e).collect(),
                ranges,
                oriented: false,
            },
            report,
        ))
    }

    /// Number of surviving tets.
    #[inline]
    pub fn tet_count(&self) -> usize {
        self.tets.len()
    }

    /// Number of real faces (the sentinel slot is not counted).
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len() - 1
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Tets containing vertex `v`.
    #[inline]
    pub fn tets_of(&self, v: usize) -> &[TetIncidence] {
        let r = self.ranges[v];
        &self.vertex_tets[r.tet_start as usize..(r.tet_start + r.tet_count) as usize]
    }

    /// Faces containing vertex `v`.
    #[inline]
    pub fn faces_of(&self, v: usize) -> &[u32] {
        let r = self.ranges[v];
        &self.vertex_faces[r.face_start as usize..(r.face_start + r.face_count) as usize]
    }

    /// Edges containing vertex `v`.
    #[inline]
    pub fn edges_of(&self, v: usize) -> &[u32] {
        let r = self.ranges[v];
        &self.vertex_edges[r.edge_start as usize..(r.edge_start + r.edge_count) as usize]
    }

    /// The endpoint of edge `e` that is not `v`.
    #[inline]
    pub fn other_endpoint(&self, e: usize, v: u32) -> u32 {
        let [a, b] = self.edges[e];
        if a == v {
            b
        } else {
            a
        }
    }

    /// True when face `f` belongs to exactly one tet.
    #[inline]
    pub fn is_surface_face(&self, f: usize) -> bool {
        f != 0 && self.face_tet_count[f] == 1
    }

    /// Per-vertex flag: the vertex lies on at least one surface face.
    pub fn surface_vertices(&self) -> Vec<bool> {
        let mut flags = vec![false; self.vertex_count];
        for (f, face) in self.faces.iter().enumerate().skip(1) {
            if self.face_tet_count[f] == 1 {
                for &v in face {
                    flags[v as usize] = true;
                }
            }
        }
        flags
    }

    /// Whether [`Connectivity::orient`] has run.
    #[inline]
    pub fn is_oriented(&self) -> bool {
        self.oriented
    }

    /// Fix the sign of each opposing-face entry from the first face-normal
    /// pass, and the outward orientation of every surface face.
    ///
    /// An entry is positive when the face's area-normal points toward the
    /// vertex (dot of the normal with the centroid→vertex vector > 0).
    /// `face_normals` is indexed by face id, sentinel included.
    pub fn orient(&mut self, face_normals: &[Vec3], positions: &[Vec3]) {
        for v in 0..self.vertex_count {
            let r = self.ranges[v];
            let start = r.tet_start as usize;
            let end = start + r.tet_count as usize;
            for inc in &mut self.vertex_tets[start..end] {
                let f = inc.opposing_face.unsigned_abs() as usize;
                let [a, b, c] = self.faces[f];
                let centroid =
                    (positions[a as usize] + positions[b as usize] + positions[c as usize]) / 3.0;
                let toward = face_normals[f].dot(positions[v] - centroid) > 0.0;
                inc.opposing_face = if toward { f as i32 } else { -(f as i32) };

                if self.face_tet_count[f] == 1 {
                    // Surface face: the tet interior lies on the vertex side.
                    self.face_outward[f] = if toward { -1.0 } else { 1.0 };
                }
            }
        }
        self.oriented = true;
    }
}

/// Canonical (ascending) face opposite local corner `corner`.
#[inline]
fn opposite_face(tet: [u32; 4], corner: usize) -> [u32; 3] {
    let mut face = [0u32; 3];
    let mut k = 0;
    for (i, &v) in tet.iter().enumerate() {
        if i != corner {
            face[k] = v;
            k += 1;
        }
    }
    face.sort_unstable();
    face
}

#[inline]
fn canonical_edge(a: u32, b: u32) -> [u32; 2] {
    if a <= b {
        [a, b]
    } else {
        [b, a]
    }
}

fn is_degenerate(tet: [u32; 4], positions: &[Vec3]) -> bool {
    for i in 0..4 {
        for j in (i + 1)..4 {
            if tet[i] == tet[j] {
                return true;
            }
        }
    }
    (0..4).any(|corner| {
        let [a, b, c] = opposite_face(tet, corner);
        is_collinear_triangle(
            positions[a as usize],
            positions[b as usize],
            positions[c as usize],
            COLLINEARITY_THRESHOLD,
        )
    })
}

/// `(start, count)` per vertex for a vertex-sorted incidence list.
fn csr_ranges(sorted_vertices: impl Iterator<Item = u32>, vertex_count: usize) -> Vec<(u32, u32)> {
    let mut counts = vec![0u32; vertex_count];
    for v in sorted_vertices {
        counts[v as usize] += 1;
    }
    let mut ranges = Vec::with_capacity(vertex_count);
    let mut offset = 0u32;
    for count in counts {
        ranges.push((offset, count));
        offset += count;
    }
    ranges
}
