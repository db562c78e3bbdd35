//! Closed-form geometry kernels shared by connectivity building and the
//! per-tick geometry refresh.

use glam::Vec3;

/// Signed volume of the tet `(p0, p1, p2, p3)`:
/// `(1/6) · (p1 − p0) · ((p2 − p0) × (p3 − p0))`.
///
/// The sign depends on corner ordering; callers that only need size use `abs()`.
#[inline]
pub fn tet_signed_volume(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> f32 {
    (p1 - p0).dot((p2 - p0).cross(p3 - p0)) / 6.0
}

/// Area-weighted triangle normal: `0.5 · (p1 − p0) × (p2 − p0)`.
///
/// The length is the triangle area, the direction its normal.
#[inline]
pub fn triangle_area_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
    0.5 * (p1 - p0).cross(p2 - p0)
}

/// Returns true when two edges of the triangle are (anti)parallel within
/// `threshold` on the normalized dot product, or when an edge has zero length.
pub fn is_collinear_triangle(p0: Vec3, p1: Vec3, p2: Vec3, threshold: f32) -> bool {
    let e01 = p1 - p0;
    let e02 = p2 - p0;
    let e12 = p2 - p1;

    let (Some(a), Some(b), Some(c)) = (e01.try_normalize(), e02.try_normalize(), e12.try_normalize())
    else {
        return true;
    };

    a.dot(b).abs() > threshold || a.dot(c).abs() > threshold || b.dot(c).abs() > threshold
}

/// Component of `v` perpendicular to the line direction `along`.
///
/// `along` need not be normalized; a zero `along` returns `v` unchanged.
#[inline]
pub fn reject_from(v: Vec3, along: Vec3) -> Vec3 {
    match along.try_normalize() {
        Some(dir) => v - v.dot(dir) * dir,
        None => v,
    }
}

/// Height vector of `apex` over the line through `a` and `b`: points from
/// the foot of the perpendicular toward `apex`.
#[inline]
pub fn height_over_edge(apex: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    reject_from(apex - a, b - a)
}
