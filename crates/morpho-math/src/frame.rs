//! Orthonormal local frames.
//!
//! A frame is built from a primary axis (a surface normal) and a secondary
//! hint (an edge direction). The hint is Gram-Schmidt orthogonalized against
//! the primary axis; the third axis completes a right-handed basis.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};

/// Right-handed orthonormal frame `(normal, tangent, bitangent)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalFrame {
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

impl LocalFrame {
    /// Builds a frame from `normal` and an in-plane `hint`.
    ///
    /// Falls back to an arbitrary perpendicular when the hint is parallel
    /// to the normal, and to the world axes when the normal is zero.
    pub fn from_normal_and_hint(normal: Vec3, hint: Vec3) -> Self {
        let Some(n) = normal.try_normalize() else {
            return Self::IDENTITY;
        };
        let t = (hint - hint.dot(n) * n)
            .try_normalize()
            .unwrap_or_else(|| n.any_orthonormal_vector());
        Self {
            normal: n,
            tangent: t,
            bitangent: n.cross(t),
        }
    }

    /// World axes.
    pub const IDENTITY: Self = Self {
        normal: Vec3::X,
        tangent: Vec3::Y,
        bitangent: Vec3::Z,
    };

    /// Column matrix `[normal | tangent | bitangent]`.
    #[inline]
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_cols(self.normal, self.tangent, self.bitangent)
    }

    /// Expresses a world-space offset in frame coordinates.
    ///
    /// The frame is orthonormal, so the inverse is the transpose.
    #[inline]
    pub fn to_local(&self, offset: Vec3) -> Vec3 {
        self.matrix().transpose() * offset
    }

    /// Reconstructs a world-space offset from frame coordinates.
    #[inline]
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.matrix() * local
    }
}
