//! Procedural mesh generators for benchmarks and testing.
//!
//! These generators produce deterministic, resolution-configurable meshes.
//! Tet meshes come without boundary markers, so the solver derives the
//! boundary from the surface faces.

use morpho_math::Vec3;

use crate::mesh::{RenderMesh, TetMesh};

/// A single tet with corners at `origin`, `origin + scale·X`,
/// `origin + scale·Y`, and `origin + scale·Z`.
///
/// # Example
/// ```
/// use morpho_mesh::generators::single_tet;
/// use morpho_math::Vec3;
/// let mesh = single_tet(Vec3::ZERO, 1.0);
/// assert_eq!(mesh.vertex_count(), 4);
/// assert_eq!(mesh.tet_count(), 1);
/// ```
pub fn single_tet(origin: Vec3, scale: f32) -> TetMesh {
    let mut mesh = TetMesh::with_capacity(4, 1);
    mesh.push_vertex(origin);
    mesh.push_vertex(origin + scale * Vec3::X);
    mesh.push_vertex(origin + scale * Vec3::Y);
    mesh.push_vertex(origin + scale * Vec3::Z);
    mesh.push_tet([0, 1, 2, 3]);
    mesh
}

/// Generates an axis-aligned box of `cols × rows × layers` voxels, each
/// split into 6 tets (Kuhn subdivision along the cell's main diagonal).
///
/// The box spans `origin` to `origin + size`. The Kuhn split is conforming:
/// neighbouring cells agree on the diagonal of every shared quad.
///
/// # Arguments
/// - `cols`, `rows`, `layers` — Voxel counts along X, Y, Z (vertex count = n + 1).
/// - `size` — Total extent in meters.
/// - `origin` — Minimum corner.
pub fn tet_box(cols: usize, rows: usize, layers: usize, size: Vec3, origin: Vec3) -> TetMesh {
    let (nx, ny, nz) = (cols + 1, rows + 1, layers + 1);
    let mut mesh = TetMesh::with_capacity(nx * ny * nz, cols * rows * layers * 6);

    let cell = Vec3::new(
        size.x / cols.max(1) as f32,
        size.y / rows.max(1) as f32,
        size.z / layers.max(1) as f32,
    );

    // Vertex grid, x fastest
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                mesh.push_vertex(origin + cell * Vec3::new(i as f32, j as f32, k as f32));
            }
        }
    }

    let index = |i: usize, j: usize, k: usize| (k * ny * nx + j * nx + i) as u32;

    // The 6 axis orderings walking from corner 000 to corner 111
    const PATHS: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    for k in 0..layers {
        for j in 0..rows {
            for i in 0..cols {
                for path in PATHS {
                    let mut corner = [i, j, k];
                    let mut tet = [index(i, j, k), 0, 0, 0];
                    for (step, &axis) in path.iter().enumerate() {
                        corner[axis] += 1;
                        tet[step + 1] = index(corner[0], corner[1], corner[2]);
                    }
                    mesh.push_tet(tet);
                }
            }
        }
    }

    mesh
}

/// Generates a UV sphere render mesh centered at `center`.
///
/// # Arguments
/// - `radius` — Sphere radius in meters.
/// - `stacks` — Number of horizontal slices (latitude divisions).
/// - `slices` — Number of vertical slices (longitude divisions).
pub fn uv_sphere(center: Vec3, radius: f32, stacks: usize, slices: usize) -> RenderMesh {
    let mut mesh = RenderMesh::with_capacity((stacks + 1) * (slices + 1), stacks * slices * 2);

    for i in 0..=stacks {
        let phi = std::f32::consts::PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = 2.0 * std::f32::consts::PI * j as f32 / slices as f32;
            let dir = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
            mesh.push_vertex(center + radius * dir);
        }
    }

    for i in 0..stacks {
        for j in 0..slices {
            let a = (i * (slices + 1) + j) as u32;
            let b = a + (slices + 1) as u32;

            // Skip degenerate triangles at poles
            if i != 0 {
                mesh.indices.extend_from_slice(&[a, b, a + 1]);
            }
            if i != stacks - 1 {
                mesh.indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }

    mesh
}

/// Generates the 8-vertex, 12-triangle surface of an axis-aligned box.
pub fn box_surface(min: Vec3, max: Vec3) -> RenderMesh {
    let mut mesh = RenderMesh::with_capacity(8, 12);
    for k in 0..2 {
        for j in 0..2 {
            for i in 0..2 {
                let pick = |lo: f32, hi: f32, bit: usize| if bit == 0 { lo } else { hi };
                mesh.push_vertex(Vec3::new(
                    pick(min.x, max.x, i),
                    pick(min.y, max.y, j),
                    pick(min.z, max.z, k),
                ));
            }
        }
    }

    // Corner index = i + 2j + 4k; CCW seen from outside
    const QUADS: [[u32; 4]; 6] = [
        [0, 2, 3, 1], // -Z
        [4, 5, 7, 6], // +Z
        [0, 4, 6, 2], // -X
        [1, 3, 7, 5], // +X
        [0, 1, 5, 4], // -Y
        [2, 6, 7, 3], // +Y
    ];
    for [a, b, c, d] in QUADS {
        mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    mesh
}
