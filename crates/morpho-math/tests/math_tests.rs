//! Integration tests for morpho-math.

use morpho_math::geometry::{
    height_over_edge, is_collinear_triangle, reject_from, tet_signed_volume, triangle_area_normal,
};
use morpho_math::{LocalFrame, Vec3};

// ─── Geometry Kernel Tests ────────────────────────────────────

#[test]
fn unit_tet_volume() {
    let v = tet_signed_volume(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z);
    assert!((v - 1.0 / 6.0).abs() < 1e-7);
}

#[test]
fn swapped_corners_flip_sign() {
    let v = tet_signed_volume(Vec3::ZERO, Vec3::Y, Vec3::X, Vec3::Z);
    assert!((v + 1.0 / 6.0).abs() < 1e-7);
}

#[test]
fn area_normal_length_is_area() {
    let n = triangle_area_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
    assert!((n.length() - 0.5).abs() < 1e-7);
    assert!(n.z > 0.0);
}

#[test]
fn collinear_detection() {
    assert!(is_collinear_triangle(Vec3::ZERO, Vec3::X, 2.0 * Vec3::X, 0.9995));
    assert!(is_collinear_triangle(Vec3::ZERO, Vec3::ZERO, Vec3::Y, 0.9995));
    assert!(!is_collinear_triangle(Vec3::ZERO, Vec3::X, Vec3::Y, 0.9995));
}

#[test]
fn nearly_collinear_sliver_is_caught() {
    // Apex 1e-3 off the base line: angle well under the 0.9995 cutoff.
    let apex = Vec3::new(0.5, 1.0e-3, 0.0);
    assert!(is_collinear_triangle(Vec3::ZERO, Vec3::X, apex, 0.9995));
}

#[test]
fn rejection_removes_parallel_part() {
    let r = reject_from(Vec3::new(3.0, 4.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
    assert!((r - Vec3::new(0.0, 4.0, 0.0)).length() < 1e-6);
    assert_eq!(reject_from(Vec3::ONE, Vec3::ZERO), Vec3::ONE);
}

#[test]
fn height_is_perpendicular() {
    let h = height_over_edge(Vec3::new(0.3, 2.0, 0.0), Vec3::ZERO, Vec3::X);
    assert!((h - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);
}

// ─── Local Frame Tests ────────────────────────────────────────

#[test]
fn frame_is_orthonormal() {
    let f = LocalFrame::from_normal_and_hint(Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
    assert!((f.normal.length() - 1.0).abs() < 1e-6);
    assert!(f.normal.dot(f.tangent).abs() < 1e-6);
    assert!((f.tangent - Vec3::X).length() < 1e-6);
    assert!((f.bitangent - Vec3::Y.cross(Vec3::X)).length() < 1e-6);
}

#[test]
fn local_world_inverse() {
    let f = LocalFrame::from_normal_and_hint(Vec3::new(0.3, 0.9, 0.1), Vec3::Z);
    let offset = Vec3::new(0.5, -1.25, 2.0);
    let back = f.to_world(f.to_local(offset));
    assert!((back - offset).length() < 1e-5);
}

#[test]
fn parallel_hint_falls_back() {
    let f = LocalFrame::from_normal_and_hint(Vec3::Y, Vec3::Y);
    assert!(f.tangent.is_finite());
    assert!(f.normal.dot(f.tangent).abs() < 1e-6);
}

#[test]
fn zero_normal_gives_identity() {
    assert_eq!(LocalFrame::from_normal_and_hint(Vec3::ZERO, Vec3::X), LocalFrame::IDENTITY);
}
