//! State snapshot serialization for replay and debugging.
//!
//! Snapshots capture the kinematic state and constraint bookkeeping of a
//! [`SoftBody`] at one tick, enabling diff-based debugging between runs.

use std::fs;
use std::path::Path;

use morpho_math::Vec3;
use morpho_solver::SoftBody;
use morpho_types::{MorphoError, MorphoResult};
use serde::{Deserialize, Serialize};

/// A simulation state snapshot.
///
/// Serialized with `bincode` for compact binary output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Tick counter when this snapshot was taken.
    pub tick: u64,
    /// Simulation time in seconds.
    pub sim_time: f64,
    /// Vertex positions (flat: [x0, y0, z0, x1, y1, z1, ...]).
    pub positions: Vec<f32>,
    /// Vertex velocities (flat: [vx0, vy0, vz0, ...]).
    pub velocities: Vec<f32>,
    /// Active position-constraint count per vertex.
    pub position_locks: Vec<u32>,
    /// Active force-constraint count per vertex.
    pub force_locks: Vec<u32>,
    /// Number of vertices.
    pub vertex_count: usize,
}

impl StateSnapshot {
    /// Captures the current state of `body`.
    pub fn capture(body: &SoftBody) -> Self {
        let attrs = body.attributes();
        Self {
            tick: body.tick_count(),
            sim_time: body.sim_time() as f64,
            positions: flatten(body.positions()),
            velocities: flatten(body.velocities()),
            position_locks: attrs.position_locks.clone(),
            force_locks: attrs.force_locks.clone(),
            vertex_count: body.vertex_count(),
        }
    }

    /// Position of vertex `v`.
    pub fn position(&self, v: usize) -> Vec3 {
        Vec3::new(self.positions[v * 3], self.positions[v * 3 + 1], self.positions[v * 3 + 2])
    }

    /// Largest per-vertex position difference to `other`, or `None` when
    /// the vertex counts differ.
    pub fn max_position_delta(&self, other: &StateSnapshot) -> Option<f32> {
        if self.vertex_count != other.vertex_count {
            return None;
        }
        Some(
            (0..self.vertex_count)
                .map(|v| self.position(v).distance(other.position(v)))
                .fold(0.0, f32::max),
        )
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> MorphoResult<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| MorphoError::Serialization(format!("snapshot serialization failed: {e}")))
    }

    /// Deserializes from binary format.
    pub fn from_bytes(data: &[u8]) -> MorphoResult<Self> {
        let snapshot: Self = bincode::deserialize(data)
            .map_err(|e| MorphoError::Serialization(format!("snapshot deserialization failed: {e}")))?;
        let n = snapshot.vertex_count;
        if snapshot.positions.len() != n * 3
            || snapshot.velocities.len() != n * 3
            || snapshot.position_locks.len() != n
            || snapshot.force_locks.len() != n
        {
            return Err(MorphoError::Serialization(format!(
                "snapshot arrays do not match vertex count {n}"
            )));
        }
        Ok(snapshot)
    }

    /// Writes the binary form to `path`.
    pub fn save(&self, path: &Path) -> MorphoResult<()> {
        fs::write(path, self.to_bytes()?)?;
        tracing::debug!(path = %path.display(), tick = self.tick, "snapshot written");
        Ok(())
    }

    /// Reads a snapshot written by [`StateSnapshot::save`].
    pub fn load(path: &Path) -> MorphoResult<Self> {
        Self::from_bytes(&fs::read(path)?)
    }
}

fn flatten(values: &[Vec3]) -> Vec<f32> {
    values.iter().flat_map(|v| v.to_array()).collect()
}
