//! # morpho-math
//!
//! Geometry primitives for the morpho simulation engine.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Mat3`, etc.)
//! - Tetrahedron / triangle kernels (signed volume, area-normal, collinearity)
//! - Orthonormal local frames used by skinning

pub mod frame;
pub mod geometry;

pub use frame::LocalFrame;

// Re-export glam types as the canonical math types for morpho.
pub use glam::{Mat3, Quat, Vec3};
