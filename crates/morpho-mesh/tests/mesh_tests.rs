//! Integration tests for morpho-mesh.

use std::collections::HashSet;

use morpho_math::geometry::{tet_signed_volume, triangle_area_normal};
use morpho_math::Vec3;
use morpho_mesh::generators::{box_surface, single_tet, tet_box, uv_sphere};
use morpho_mesh::{Connectivity, TetMesh};

fn unit_positions() -> Vec<Vec3> {
    vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z]
}

fn face_normals(conn: &Connectivity, positions: &[Vec3]) -> Vec<Vec3> {
    conn.faces
        .iter()
        .enumerate()
        .map(|(f, &[a, b, c])| {
            if f == 0 {
                Vec3::ZERO
            } else {
                triangle_area_normal(
                    positions[a as usize],
                    positions[b as usize],
                    positions[c as usize],
                )
            }
        })
        .collect()
}

// ─── TetMesh Tests ────────────────────────────────────────────

#[test]
fn basic_counts() {
    let mesh = single_tet(Vec3::ZERO, 1.0);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.tet_count(), 1);
    assert_eq!(mesh.tet(0), [0, 1, 2, 3]);
    assert_eq!(mesh.position(2), Vec3::Y);
}

#[test]
fn validate_ok() {
    assert!(single_tet(Vec3::ZERO, 1.0).validate().is_ok());
}

#[test]
fn validate_catches_inconsistent_lengths() {
    let mut mesh = single_tet(Vec3::ZERO, 1.0);
    mesh.pos_z.push(1.0);
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_catches_oob_index() {
    let mut mesh = single_tet(Vec3::ZERO, 1.0);
    mesh.tets[3] = 17;
    assert!(mesh.validate().is_err());
}

#[test]
fn validate_catches_marker_mismatch() {
    let mut mesh = single_tet(Vec3::ZERO, 1.0);
    mesh.boundary_markers = vec![1, 0, 1];
    assert!(mesh.validate().is_err());
}

#[test]
fn wide_boundary_markers() {
    let mut mesh = single_tet(Vec3::ZERO, 1.0);
    mesh.marker_width = 2;
    mesh.boundary_markers = vec![0, 0, 0, 3, 1, 0, 0, 0];
    assert!(mesh.validate().is_ok());
    assert_eq!(mesh.boundary_flags(), Some(vec![false, true, true, false]));
}

#[test]
fn no_markers_means_none() {
    assert!(single_tet(Vec3::ZERO, 1.0).boundary_flags().is_none());
}

#[test]
fn from_interleaved() {
    let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
    let mesh = TetMesh::from_interleaved(&positions, &[0, 1, 2, 3]).unwrap();
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.pos_x, vec![0.0, 1.0, 0.0, 0.0]);
    assert!(TetMesh::from_interleaved(&positions[..11], &[0, 1, 2, 3]).is_err());
}

#[test]
fn tet_mesh_serialization() {
    let mesh = single_tet(Vec3::ONE, 2.0);
    let json = serde_json::to_string(&mesh).unwrap();
    let back: TetMesh = serde_json::from_str(&json).unwrap();
    assert_eq!(back.tets, mesh.tets);
    assert_eq!(back.marker_width, 1);
}

// ─── Connectivity Tests ───────────────────────────────────────

#[test]
fn degenerate_input_scenario() {
    let (conn, report) = Connectivity::build(&[0, 0, 1, 2, 0, 1, 2, 3], &unit_positions()).unwrap();

    assert_eq!(report.input_tets, 2);
    assert_eq!(report.dropped_tets, 1);
    assert_eq!(conn.tet_count(), 1);
    assert_eq!(conn.face_count(), 4);
    assert_eq!(conn.faces.len(), 5); // sentinel + 4
    assert_eq!(conn.faces[0], [0, 0, 0]);
    assert_eq!(conn.edge_count(), 6);

    for v in 0..4 {
        let r = conn.ranges[v];
        assert_eq!(r.tet_count, 1, "vertex {v}");
        assert_eq!(r.face_count, 3, "vertex {v}");
        assert_eq!(r.edge_count, 3, "vertex {v}");
    }
}

#[test]
fn collinear_face_drops_tet() {
    let positions = vec![Vec3::ZERO, Vec3::X, 2.0 * Vec3::X, Vec3::Z];
    let (conn, report) = Connectivity::build(&[0, 1, 2, 3], &positions).unwrap();
    assert_eq!(report.dropped_tets, 1);
    assert_eq!(conn.tet_count(), 0);
    assert_eq!(conn.face_count(), 0);
}

#[test]
fn out_of_range_index_is_error() {
    assert!(Connectivity::build(&[0, 1, 2, 9], &unit_positions()).is_err());
    assert!(Connectivity::build(&[0, 1, 2], &unit_positions()).is_err());
}

#[test]
fn canonical_and_unique() {
    let mesh = tet_box(3, 2, 2, Vec3::new(3.0, 2.0, 2.0), Vec3::ZERO);
    let (conn, report) = Connectivity::build(&mesh.tets, &mesh.positions()).unwrap();
    assert_eq!(report.dropped_tets, 0);

    let mut seen_faces = HashSet::new();
    for face in conn.faces.iter().skip(1) {
        assert!(face[0] <= face[1] && face[1] <= face[2], "{face:?}");
        assert!(seen_faces.insert(*face), "duplicate face {face:?}");
    }

    let mut seen_edges = HashSet::new();
    for edge in &conn.edges {
        assert!(edge[0] <= edge[1], "{edge:?}");
        assert!(seen_edges.insert(*edge), "duplicate edge {edge:?}");
    }
}

#[test]
fn csr_ranges_are_contiguous() {
    let mesh = tet_box(2, 2, 2, Vec3::ONE, Vec3::ZERO);
    let (conn, _) = Connectivity::build(&mesh.tets, &mesh.positions()).unwrap();

    let mut expected = 0;
    for r in &conn.ranges {
        assert_eq!(r.tet_start, expected);
        expected += r.tet_count;
    }
    assert_eq!(expected as usize, conn.vertex_tets.len());
    assert_eq!(conn.vertex_tets.len(), conn.tet_count() * 4);
    assert_eq!(conn.vertex_faces.len(), conn.face_count() * 3);
    assert_eq!(conn.vertex_edges.len(), conn.edge_count() * 2);

    for v in 0..conn.vertex_count {
        for inc in conn.tets_of(v) {
            assert_eq!(conn.tets[inc.tet as usize][inc.corner as usize], v as u32);
            assert!(!conn.faces[inc.face()].contains(&(v as u32)));
        }
        for &f in conn.faces_of(v) {
            assert!(conn.faces[f as usize].contains(&(v as u32)));
        }
        for &e in conn.edges_of(v) {
            assert!(conn.edges[e as usize].contains(&(v as u32)));
        }
    }
}

#[test]
fn orient_points_opposing_faces() {
    let positions = unit_positions();
    let (mut conn, _) = Connectivity::build(&[0, 1, 2, 3], &positions).unwrap();
    let normals = face_normals(&conn, &positions);
    conn.orient(&normals, &positions);
    assert!(conn.is_oriented());

    for v in 0..4 {
        let inc = conn.tets_of(v)[0];
        let [a, b, c] = conn.faces[inc.face()];
        let centroid = (positions[a as usize] + positions[b as usize] + positions[c as usize]) / 3.0;
        let toward = inc.toward_sign() * normals[inc.face()];
        assert!(toward.dot(positions[v] - centroid) > 0.0, "vertex {v}");
    }

    // Every face of a lone tet is surface, and outward points away from the tet
    let centroid = positions.iter().copied().sum::<Vec3>() / 4.0;
    for f in 1..conn.faces.len() {
        assert!(conn.is_surface_face(f));
        let [a, _, _] = conn.faces[f];
        let outward = conn.face_outward[f] * normals[f];
        assert!(outward.dot(positions[a as usize] - centroid) > 0.0, "face {f}");
    }
}

#[test]
fn interior_faces_are_not_surface() {
    let mesh = tet_box(1, 1, 1, Vec3::ONE, Vec3::ZERO);
    let (conn, _) = Connectivity::build(&mesh.tets, &mesh.positions()).unwrap();
    let surface = (1..conn.faces.len()).filter(|&f| conn.is_surface_face(f)).count();
    // 6 cube sides × 2 triangles
    assert_eq!(surface, 12);
    assert!(conn.surface_vertices().iter().all(|&b| b));
}

#[test]
fn other_endpoint() {
    let (conn, _) = Connectivity::build(&[0, 1, 2, 3], &unit_positions()).unwrap();
    for (e, &[a, b]) in conn.edges.iter().enumerate() {
        assert_eq!(conn.other_endpoint(e, a), b);
        assert_eq!(conn.other_endpoint(e, b), a);
    }
}

// ─── Generator Tests ──────────────────────────────────────────

#[test]
fn tet_box_volume() {
    let mesh = tet_box(2, 3, 1, Vec3::new(2.0, 3.0, 1.0), Vec3::new(-1.0, 0.0, 0.0));
    assert_eq!(mesh.vertex_count(), 3 * 4 * 2);
    assert_eq!(mesh.tet_count(), 2 * 3 * 6);
    assert!(mesh.validate().is_ok());

    let total: f32 = (0..mesh.tet_count())
        .map(|t| {
            let [a, b, c, d] = mesh.tet(t);
            tet_signed_volume(
                mesh.position(a as usize),
                mesh.position(b as usize),
                mesh.position(c as usize),
                mesh.position(d as usize),
            )
            .abs()
        })
        .sum();
    assert!((total - 6.0).abs() < 1e-4, "total volume {total}");
}

#[test]
fn uv_sphere_on_radius() {
    let center = Vec3::new(0.0, 1.0, 0.0);
    let mesh = uv_sphere(center, 0.5, 8, 16);
    assert!(mesh.validate().is_ok());
    for p in mesh.positions() {
        assert!(((p - center).length() - 0.5).abs() < 1e-5);
    }
}

#[test]
fn box_surface_winding_outward() {
    let mesh = box_surface(Vec3::ZERO, Vec3::ONE);
    assert_eq!(mesh.vertex_count(), 8);
    assert_eq!(mesh.triangle_count(), 12);
    let center = Vec3::splat(0.5);
    for t in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (
            mesh.position(t[0] as usize),
            mesh.position(t[1] as usize),
            mesh.position(t[2] as usize),
        );
        let n = triangle_area_normal(a, b, c);
        assert!(n.dot((a + b + c) / 3.0 - center) > 0.0);
    }
}
