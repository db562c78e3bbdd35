//! Integration tests for morpho-skin.

use morpho_math::geometry::triangle_area_normal;
use morpho_math::{Quat, Vec3};
use morpho_mesh::generators::{box_surface, tet_box, uv_sphere};
use morpho_mesh::{Connectivity, RenderMesh};
use morpho_skin::{KdTree, SkinBinding};
use morpho_types::constants::COLLINEARITY_THRESHOLD;

/// Surface-oriented connectivity, outward vertex normals, and boundary
/// flags for a tet box.
fn sim_box(n: usize, origin: Vec3) -> (Connectivity, Vec<Vec3>, Vec<Vec3>, Vec<bool>) {
    let mesh = tet_box(n, n, n, Vec3::ONE, origin);
    let positions = mesh.positions();
    let (mut conn, _) = Connectivity::build(&mesh.tets, &positions).unwrap();
    let face_normals = face_normals(&conn, &positions);
    conn.orient(&face_normals, &positions);
    let normals = vertex_normals(&conn, &face_normals);
    let boundary = conn.surface_vertices();
    (conn, positions, normals, boundary)
}

fn face_normals(conn: &Connectivity, positions: &[Vec3]) -> Vec<Vec3> {
    conn.faces
        .iter()
        .enumerate()
        .map(|(f, &[a, b, c])| {
            if f == 0 {
                Vec3::ZERO
            } else {
                triangle_area_normal(positions[a as usize], positions[b as usize], positions[c as usize])
            }
        })
        .collect()
}

fn vertex_normals(conn: &Connectivity, face_normals: &[Vec3]) -> Vec<Vec3> {
    (0..conn.vertex_count)
        .map(|v| {
            conn.faces_of(v)
                .iter()
                .map(|&f| conn.face_outward[f as usize] * face_normals[f as usize])
                .sum::<Vec3>()
                .normalize_or_zero()
        })
        .collect()
}

// ─── KdTree Tests ─────────────────────────────────────────────

#[test]
fn kdtree_matches_brute_force() {
    let points: Vec<Vec3> = (0..200)
        .map(|i| {
            let f = i as f32;
            Vec3::new((f * 0.37).sin() * 3.0, (f * 0.71).cos() * 2.0, (f * 0.13).sin() * f * 0.01)
        })
        .collect();
    let tree = KdTree::build(points.iter().enumerate().map(|(i, &p)| (p, i as u32)));
    assert_eq!(tree.len(), 200);

    for q in [Vec3::ZERO, Vec3::new(1.0, -1.0, 0.5), Vec3::splat(10.0)] {
        let got = tree.nearest(q, 5);

        let mut brute: Vec<(u32, f32)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u32, p.distance_squared(q)))
            .collect();
        brute.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        brute.truncate(5);

        assert_eq!(got, brute, "query {q}");
    }
}

#[test]
fn kdtree_fewer_points_than_k() {
    let tree = KdTree::build([(Vec3::ZERO, 7), (Vec3::X, 3)]);
    let got = tree.nearest(Vec3::new(0.9, 0.0, 0.0), 4);
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].0, 3);
    assert_eq!(got[1].0, 7);
    assert!(tree.nearest(Vec3::ZERO, 0).is_empty());
    assert!(KdTree::build(std::iter::empty()).nearest(Vec3::ZERO, 3).is_empty());
}

// ─── Binding Tests ────────────────────────────────────────────

#[test]
fn weights_sum_to_one() {
    let (conn, positions, normals, boundary) = sim_box(2, Vec3::ZERO);
    let render = uv_sphere(Vec3::splat(0.5), 0.7, 6, 8);
    let (binding, report) = SkinBinding::bind(&render, &positions, &normals, &boundary, &conn, 4).unwrap();

    assert_eq!(report.render_vertices, render.vertex_count());
    assert_eq!(report.short_vertices, 0);
    assert_eq!(report.unbound_vertices, 0);
    for r in 0..binding.render_vertex_count() {
        let influences = binding.influences_of(r);
        assert_eq!(influences.len(), 4);
        let total: f32 = influences.iter().map(|i| i.weight).sum();
        assert!((total - 1.0).abs() < 1e-5, "render vertex {r}: {total}");
        for inf in influences {
            assert!(boundary[inf.effector as usize]);
            assert!(boundary[inf.partner as usize]);
        }
    }
}

#[test]
fn rest_pose_reconstructs_render_mesh() {
    let (conn, positions, normals, boundary) = sim_box(2, Vec3::ZERO);
    let render = uv_sphere(Vec3::splat(0.5), 0.8, 5, 7);
    let (binding, _) = SkinBinding::bind(&render, &positions, &normals, &boundary, &conn, 3).unwrap();

    let mut out = vec![Vec3::ZERO; render.vertex_count()];
    binding.deform(&positions, &normals, &mut out);
    for (a, b) in out.iter().zip(render.positions()) {
        assert!((*a - b).length() < 1e-4, "{a} vs {b}");
    }
}

#[test]
fn rigid_motion_carries_render_mesh() {
    let (conn, positions, normals, boundary) = sim_box(1, Vec3::ZERO);
    let render = box_surface(Vec3::splat(-0.1), Vec3::splat(1.1));
    let (binding, _) = SkinBinding::bind(&render, &positions, &normals, &boundary, &conn, 2).unwrap();

    let rotation = Quat::from_rotation_y(0.6);
    let shift = Vec3::new(2.0, -1.0, 0.5);
    let moved: Vec<Vec3> = positions.iter().map(|&p| rotation * p + shift).collect();
    let moved_normals: Vec<Vec3> = normals.iter().map(|&n| rotation * n).collect();

    let mut out = vec![Vec3::ZERO; render.vertex_count()];
    binding.deform(&moved, &moved_normals, &mut out);
    for (a, b) in out.iter().zip(render.positions()) {
        let expected = rotation * b + shift;
        assert!((*a - expected).length() < 1e-4, "{a} vs {expected}");
    }
}

#[test]
fn partners_lie_on_surface_edges() {
    let (conn, positions, normals, boundary) = sim_box(2, Vec3::ZERO);
    let render = uv_sphere(Vec3::splat(0.5), 0.9, 6, 8);
    let (binding, _) = SkinBinding::bind(&render, &positions, &normals, &boundary, &conn, 4).unwrap();

    for r in 0..binding.render_vertex_count() {
        for inf in binding.influences_of(r) {
            let (e, p) = (inf.effector as usize, inf.partner);
            let on_surface = conn
                .faces_of(e)
                .iter()
                .any(|&f| conn.is_surface_face(f as usize) && conn.faces[f as usize].contains(&p));
            assert!(on_surface, "effector {e} partner {p} is not a surface edge");

            let edge = (positions[p as usize] - positions[e]).normalize();
            let alignment = normals[e].normalize().dot(edge).abs();
            assert!(alignment <= COLLINEARITY_THRESHOLD, "effector {e} partner {p}: {alignment}");
        }
    }
}

#[test]
fn rigid_motion_with_diagonal_corner_normals() {
    // Corner 0 of a Kuhn voxel has its body diagonal along the normal.
    let (conn, positions, normals, boundary) = sim_box(1, Vec3::ZERO);
    let diagonal = (positions[7] - positions[0]).normalize();
    assert!(normals[0].dot(diagonal).abs() > COLLINEARITY_THRESHOLD);

    let render = uv_sphere(Vec3::splat(0.5), 1.0, 4, 6);
    let (binding, _) = SkinBinding::bind(&render, &positions, &normals, &boundary, &conn, 3).unwrap();

    let rotation = Quat::from_axis_angle(Vec3::new(0.3, -1.0, 0.6).normalize(), 1.1);
    let shift = Vec3::new(-0.5, 3.0, 1.25);
    let moved: Vec<Vec3> = positions.iter().map(|&p| rotation * p + shift).collect();
    let moved_normals: Vec<Vec3> = normals.iter().map(|&n| rotation * n).collect();

    let mut out = vec![Vec3::ZERO; render.vertex_count()];
    binding.deform(&moved, &moved_normals, &mut out);
    for (a, b) in out.iter().zip(render.positions()) {
        let expected = rotation * b + shift;
        assert!((*a - expected).length() < 1e-4, "{a} vs {expected}");
    }
}

#[test]
fn exhaustion_is_reported_not_fatal() {
    let (conn, positions, normals, boundary) = sim_box(1, Vec3::ZERO);
    let render = box_surface(Vec3::ZERO, Vec3::ONE);
    // A unit box has 8 boundary vertices
    let (binding, report) = SkinBinding::bind(&render, &positions, &normals, &boundary, &conn, 12).unwrap();
    assert_eq!(report.short_vertices, 8);
    assert_eq!(report.unbound_vertices, 0);
    assert_eq!(binding.influences_of(0).len(), 8);
}

#[test]
fn isolated_boundary_vertices_are_not_effectors() {
    let (conn, positions, normals, _) = sim_box(1, Vec3::ZERO);
    // Only vertex 0 is flagged, so it has no boundary neighbour.
    let mut boundary = vec![false; positions.len()];
    boundary[0] = true;
    let render = box_surface(Vec3::ZERO, Vec3::ONE);
    assert!(SkinBinding::bind(&render, &positions, &normals, &boundary, &conn, 1).is_err());

    boundary[1] = true;
    let (binding, _) = SkinBinding::bind(&render, &positions, &normals, &boundary, &conn, 1).unwrap();
    for r in 0..binding.render_vertex_count() {
        let e = binding.influences_of(r)[0].effector;
        assert!(e == 0 || e == 1);
    }
}

#[test]
fn bind_rejects_bad_input() {
    let (conn, positions, normals, boundary) = sim_box(1, Vec3::ZERO);
    let render = box_surface(Vec3::ZERO, Vec3::ONE);
    assert!(SkinBinding::bind(&render, &positions, &normals, &boundary, &conn, 0).is_err());
    assert!(SkinBinding::bind(&render, &positions, &normals[..3], &boundary, &conn, 2).is_err());

    let mut broken = RenderMesh::default();
    broken.pos_x.push(0.0);
    assert!(SkinBinding::bind(&broken, &positions, &normals, &boundary, &conn, 2).is_err());
}

#[test]
fn influence_serialization() {
    let (conn, positions, normals, boundary) = sim_box(1, Vec3::ZERO);
    let render = box_surface(Vec3::ZERO, Vec3::ONE);
    let (binding, report) = SkinBinding::bind(&render, &positions, &normals, &boundary, &conn, 2).unwrap();
    let json = serde_json::to_string(binding.influences_of(3)).unwrap();
    let back: Vec<morpho_skin::SkinInfluence> = serde_json::from_str(&json).unwrap();
    assert_eq!(back, binding.influences_of(3));
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("short_vertices"));
}
